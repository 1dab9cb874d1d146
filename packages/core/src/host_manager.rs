//! Host Manager
//!
//! Owns everything shared between files: the transformer registry (built-ins
//! plus plugins) and the isolation boundary around one engine version. Hosts
//! borrow the manager, so the boundary is torn down only after the last host
//! is gone, and always when the manager is dropped.

use crate::directives::{Directives, GENERATOR_KEY};
use crate::engine::{EngineBoundary, RuntimeVersion, TemplateEngine};
use crate::error::{HostManagerError, RegistryError};
use crate::host::Host;
use crate::logging::{Logger, NullLogger};
use crate::plugin::{discover_plugins, TransformerPlugin};
use crate::registry::TransformerRegistry;
use crate::transformers::{MVC_HELPER_TRANSFORMER, MVC_VIEW_TRANSFORMER, TEMPLATE_TRANSFORMER};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Plugin directory, relative to the working directory.
pub const DEFAULT_PLUGIN_DIRECTORY: &str = "plugins";
/// Templates under a folder with this name default to the view transformer.
pub const VIEWS_FOLDER: &str = "Views";
/// Templates under a folder with this name default to the helper transformer.
pub const HELPERS_FOLDER: &str = "App_Code";

pub struct HostManager {
    working_directory: PathBuf,
    registry: TransformerRegistry,
    default_transformer: String,
    default_view_transformer: String,
    default_helper_transformer: String,
    logger: Arc<dyn Logger>,
    boundary: EngineBoundary,
}

impl HostManager {
    /// A manager with the default builder settings.
    pub fn new(
        working_directory: impl Into<PathBuf>,
        load_extensions: bool,
        default_runtime: RuntimeVersion,
    ) -> Result<Self, HostManagerError> {
        Self::builder(working_directory)
            .load_extensions(load_extensions)
            .runtime(default_runtime)
            .build()
    }

    pub fn builder(working_directory: impl Into<PathBuf>) -> HostManagerBuilder {
        HostManagerBuilder::new(working_directory)
    }

    /// A host for the template at `input_path`.
    pub fn create_host(
        &self,
        input_path: impl Into<PathBuf>,
        project_relative_path: &str,
    ) -> Host<'_> {
        Host::for_file(self, input_path.into(), project_relative_path)
    }

    /// A host for template text that is already in memory.
    pub fn create_host_for_source(
        &self,
        contents: impl Into<String>,
        project_relative_path: &str,
    ) -> Host<'_> {
        Host::for_source(self, contents.into(), project_relative_path)
    }

    pub fn runtime(&self) -> RuntimeVersion {
        self.boundary.runtime()
    }

    pub fn engine(&self) -> &dyn TemplateEngine {
        self.boundary.engine()
    }

    pub fn registry(&self) -> &TransformerRegistry {
        &self.registry
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// The `Generator` directive when present, otherwise the default for the
    /// template's location.
    pub fn transformer_name_for(&self, directives: &Directives, project_relative_path: &str) -> String {
        if let Some(name) = directives.get(GENERATOR_KEY) {
            return name.to_string();
        }
        if is_under_folder(project_relative_path, HELPERS_FOLDER) {
            self.default_helper_transformer.clone()
        } else if is_under_folder(project_relative_path, VIEWS_FOLDER) {
            self.default_view_transformer.clone()
        } else {
            self.default_transformer.clone()
        }
    }
}

impl std::fmt::Debug for HostManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostManager")
            .field("working_directory", &self.working_directory)
            .field("runtime", &self.runtime())
            .field("registry", &self.registry)
            .finish()
    }
}

/// Whether any folder in `path` is named `folder`, ignoring case.
fn is_under_folder(path: &str, folder: &str) -> bool {
    let mut segments: Vec<&str> = path.split(['/', '\\']).collect();
    segments.pop();
    segments
        .iter()
        .any(|segment| segment.eq_ignore_ascii_case(folder))
}

pub struct HostManagerBuilder {
    working_directory: PathBuf,
    load_extensions: bool,
    runtime: RuntimeVersion,
    plugin_directory: Option<PathBuf>,
    plugins: Vec<Box<dyn TransformerPlugin>>,
    logger: Option<Arc<dyn Logger>>,
    default_transformer: String,
    default_view_transformer: String,
    default_helper_transformer: String,
}

impl HostManagerBuilder {
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            working_directory: working_directory.into(),
            load_extensions: false,
            runtime: RuntimeVersion::default(),
            plugin_directory: None,
            plugins: Vec::new(),
            logger: None,
            default_transformer: TEMPLATE_TRANSFORMER.to_string(),
            default_view_transformer: MVC_VIEW_TRANSFORMER.to_string(),
            default_helper_transformer: MVC_HELPER_TRANSFORMER.to_string(),
        }
    }

    /// Scan the plugin directory for manifests.
    pub fn load_extensions(mut self, load: bool) -> Self {
        self.load_extensions = load;
        self
    }

    pub fn runtime(mut self, runtime: RuntimeVersion) -> Self {
        self.runtime = runtime;
        self
    }

    /// Overrides `<working directory>/plugins`.
    pub fn plugin_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.plugin_directory = Some(directory.into());
        self
    }

    /// Register `plugin` in addition to any discovered ones.
    pub fn plugin(mut self, plugin: impl TransformerPlugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn default_transformer(mut self, name: impl Into<String>) -> Self {
        self.default_transformer = name.into();
        self
    }

    pub fn default_view_transformer(mut self, name: impl Into<String>) -> Self {
        self.default_view_transformer = name.into();
        self
    }

    pub fn default_helper_transformer(mut self, name: impl Into<String>) -> Self {
        self.default_helper_transformer = name.into();
        self
    }

    pub fn build(self) -> Result<HostManager, HostManagerError> {
        let logger = self
            .logger
            .unwrap_or_else(|| Arc::new(NullLogger::new()) as Arc<dyn Logger>);

        // Anything failing below drops the boundary again.
        let boundary = EngineBoundary::load(self.runtime, Arc::clone(&logger))?;

        let mut registry = TransformerRegistry::with_builtins();
        for plugin in &self.plugins {
            plugin.register(&mut registry)?;
            logger.debug(&format!("registered transformer plugin '{}'", plugin.name()));
        }

        if self.load_extensions {
            let directory = self
                .plugin_directory
                .unwrap_or_else(|| self.working_directory.join(DEFAULT_PLUGIN_DIRECTORY));
            let discovered = discover_plugins(&directory)?;
            logger.debug(&format!(
                "found {} transformer plugin(s) in {}",
                discovered.len(),
                directory.display()
            ));
            for plugin in discovered {
                plugin
                    .register(&mut registry)
                    .map_err(|e| HostManagerError::Plugin {
                        path: plugin.path().to_path_buf(),
                        message: e.to_string(),
                    })?;
                logger.info(&format!(
                    "registered transformer '{}' from {}",
                    plugin.name(),
                    plugin.path().display()
                ));
            }
        }

        for name in [
            &self.default_transformer,
            &self.default_view_transformer,
            &self.default_helper_transformer,
        ] {
            if !registry.contains(name) {
                return Err(RegistryError::UnknownTransformer(name.clone()).into());
            }
        }

        Ok(HostManager {
            working_directory: self.working_directory,
            registry,
            default_transformer: self.default_transformer,
            default_view_transformer: self.default_view_transformer,
            default_helper_transformer: self.default_helper_transformer,
            logger,
            boundary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_detect_view_folders() {
        assert!(is_under_folder("Views/Home/Index.cshtml", VIEWS_FOLDER));
        assert!(is_under_folder("Areas\\Admin\\views\\List.cshtml", VIEWS_FOLDER));
        assert!(!is_under_folder("Templates/Mail.cshtml", VIEWS_FOLDER));
        assert!(!is_under_folder("Views.cshtml", VIEWS_FOLDER));
        assert!(is_under_folder("app_code/Links.cshtml", HELPERS_FOLDER));
    }
}
