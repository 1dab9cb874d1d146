//! Transformer Registry
//!
//! Maps a symbolic transformer name (the `Generator` directive value) to a
//! factory producing a fresh transformer for every file. Names compare
//! case-insensitively and may be registered once.

use crate::error::RegistryError;
use crate::transformers::{
    mvc_helper_transformer, web_page_helper_transformer, web_page_transformer, CodeTransformer,
    MvcViewTransformer, TemplateCodeTransformer, MVC_HELPER_TRANSFORMER, MVC_VIEW_TRANSFORMER,
    TEMPLATE_TRANSFORMER, WEB_PAGE_HELPER_TRANSFORMER, WEB_PAGE_TRANSFORMER,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// Builds a new transformer instance.
pub type TransformerFactory = Arc<dyn Fn() -> Box<dyn CodeTransformer> + Send + Sync>;

struct Registration {
    name: String,
    factory: TransformerFactory,
}

pub struct TransformerRegistry {
    transformers: IndexMap<String, Registration>,
}

impl TransformerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            transformers: IndexMap::new(),
        }
    }

    /// A registry holding the built-in presets.
    pub fn with_builtins() -> Self {
        let builtins: [(&str, TransformerFactory); 5] = [
            (
                TEMPLATE_TRANSFORMER,
                Arc::new(|| -> Box<dyn CodeTransformer> { Box::new(TemplateCodeTransformer::new()) }),
            ),
            (
                MVC_VIEW_TRANSFORMER,
                Arc::new(|| -> Box<dyn CodeTransformer> { Box::new(MvcViewTransformer::new()) }),
            ),
            (
                WEB_PAGE_TRANSFORMER,
                Arc::new(|| -> Box<dyn CodeTransformer> { Box::new(web_page_transformer()) }),
            ),
            (
                WEB_PAGE_HELPER_TRANSFORMER,
                Arc::new(|| -> Box<dyn CodeTransformer> { Box::new(web_page_helper_transformer()) }),
            ),
            (
                MVC_HELPER_TRANSFORMER,
                Arc::new(|| -> Box<dyn CodeTransformer> { Box::new(mvc_helper_transformer()) }),
            ),
        ];

        let mut registry = Self::new();
        for (name, factory) in builtins {
            registry.transformers.insert(
                name.to_ascii_lowercase(),
                Registration {
                    name: name.to_string(),
                    factory,
                },
            );
        }
        registry
    }

    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Box<dyn CodeTransformer> + Send + Sync + 'static,
    {
        self.register_factory(name, Arc::new(factory))
    }

    pub fn register_factory(
        &mut self,
        name: &str,
        factory: TransformerFactory,
    ) -> Result<(), RegistryError> {
        let key = name.to_ascii_lowercase();
        if self.transformers.contains_key(&key) {
            return Err(RegistryError::DuplicateTransformer(name.to_string()));
        }
        self.transformers.insert(
            key,
            Registration {
                name: name.to_string(),
                factory,
            },
        );
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transformers.contains_key(&name.to_ascii_lowercase())
    }

    /// Factory registered as `name`, for composing it into other transformers.
    pub fn factory(&self, name: &str) -> Result<TransformerFactory, RegistryError> {
        self.transformers
            .get(&name.to_ascii_lowercase())
            .map(|registration| Arc::clone(&registration.factory))
            .ok_or_else(|| RegistryError::UnknownTransformer(name.to_string()))
    }

    /// Build a new instance of the transformer registered as `name`.
    pub fn resolve(&self, name: &str) -> Result<Box<dyn CodeTransformer>, RegistryError> {
        self.transformers
            .get(&name.to_ascii_lowercase())
            .map(|registration| (registration.factory)())
            .ok_or_else(|| RegistryError::UnknownTransformer(name.to_string()))
    }

    /// Registered names in registration order, as spelled when registered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.transformers.values().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformers::SetBaseType;

    #[test]
    fn should_register_builtins() {
        let registry = TransformerRegistry::with_builtins();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["Template", "MvcView", "WebPage", "WebPageHelper", "MvcHelper"]
        );
        assert_eq!(registry.resolve("webpagehelper").unwrap().name(), "WebPageHelper");
    }

    #[test]
    fn should_resolve_case_insensitively() {
        let registry = TransformerRegistry::with_builtins();
        let transformer = registry.resolve("mvcview").unwrap();
        assert_eq!(transformer.name(), "MvcView");
    }

    #[test]
    fn should_reject_duplicate_names() {
        let mut registry = TransformerRegistry::with_builtins();
        let err = registry
            .register("TEMPLATE", || Box::new(SetBaseType::new("Other")))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTransformer("TEMPLATE".to_string()));
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn should_report_unknown_names() {
        let registry = TransformerRegistry::new();
        assert!(registry.is_empty());
        match registry.resolve("WebForm") {
            Err(RegistryError::UnknownTransformer(name)) => assert_eq!(name, "WebForm"),
            other => panic!("unexpected result: {:?}", other.map(|t| t.name().to_string())),
        }
    }
}
