//! Single-purpose transformers that presets compose.

use super::{CodeTransformer, GenerationContext};
use crate::code::{CodeAttribute, CodeDocument, TypeVisibility};
use crate::engine::EXECUTE_METHOD;
use crate::config::{is_identifier, is_namespace, HostConfig};
use crate::directives::Directives;
use crate::error::TransformerError;
use crate::version::TOOL_NAME;

pub const GENERATED_CODE_ATTRIBUTE: &str = "System.CodeDom.Compiler.GeneratedCodeAttribute";
pub const PAGE_VIRTUAL_PATH_ATTRIBUTE: &str = "System.Web.WebPages.PageVirtualPathAttribute";

/// Sets the base class the engine derives the generated class from.
pub struct SetBaseType {
    type_name: String,
}

impl SetBaseType {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

impl CodeTransformer for SetBaseType {
    fn name(&self) -> &str {
        "SetBaseType"
    }

    fn initialize(
        &mut self,
        config: &mut HostConfig,
        _directives: &Directives,
    ) -> Result<(), TransformerError> {
        config.default_base_class = self.type_name.clone();
        Ok(())
    }
}

/// Adds namespace imports, or replaces the existing ones.
pub struct SetImports {
    imports: Vec<String>,
    replace_existing: bool,
}

impl SetImports {
    pub fn new<I, S>(imports: I, replace_existing: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            imports: imports.into_iter().map(Into::into).collect(),
            replace_existing,
        }
    }
}

impl CodeTransformer for SetImports {
    fn name(&self) -> &str {
        "SetImports"
    }

    fn initialize(
        &mut self,
        config: &mut HostConfig,
        _directives: &Directives,
    ) -> Result<(), TransformerError> {
        if self.replace_existing {
            config.namespace_imports.clear();
        }
        config
            .namespace_imports
            .extend(self.imports.iter().cloned());
        Ok(())
    }
}

/// Marks the class with `GeneratedCodeAttribute("RazorGenerator", <engine version>)`.
#[derive(Default)]
pub struct AddGeneratedClassAttribute;

impl AddGeneratedClassAttribute {
    pub fn new() -> Self {
        Self
    }
}

impl CodeTransformer for AddGeneratedClassAttribute {
    fn name(&self) -> &str {
        "AddGeneratedClassAttribute"
    }

    fn process_generated_code(
        &mut self,
        context: &GenerationContext<'_>,
        document: &mut CodeDocument,
    ) -> Result<(), TransformerError> {
        document.class.attributes.push(
            CodeAttribute::new(GENERATED_CODE_ATTRIBUTE)
                .with_string(TOOL_NAME)
                .with_string(context.engine_version),
        );
        Ok(())
    }
}

/// Marks the class with its `~/`-rooted virtual path, the key the runtime view
/// engine uses to find precompiled pages.
#[derive(Default)]
pub struct AddPageVirtualPathAttribute;

impl AddPageVirtualPathAttribute {
    pub fn new() -> Self {
        Self
    }

    /// `Views\Home\Index.cshtml` → `~/Views/Home/Index.cshtml`.
    pub fn virtual_path(project_relative_path: &str) -> String {
        let path = project_relative_path
            .trim_start_matches('~')
            .replace('\\', "/");
        format!("~/{}", path.trim_start_matches('/'))
    }
}

impl CodeTransformer for AddPageVirtualPathAttribute {
    fn name(&self) -> &str {
        "AddPageVirtualPathAttribute"
    }

    fn process_generated_code(
        &mut self,
        context: &GenerationContext<'_>,
        document: &mut CodeDocument,
    ) -> Result<(), TransformerError> {
        let path = Self::virtual_path(context.project_relative_path);
        document
            .class
            .attributes
            .push(CodeAttribute::new(PAGE_VIRTUAL_PATH_ATTRIBUTE).with_string(&path));
        Ok(())
    }
}

/// Sets the visibility of the generated class; unknown values mean public.
pub struct SetTypeVisibility {
    visibility: TypeVisibility,
}

impl SetTypeVisibility {
    pub fn new(value: &str) -> Self {
        Self {
            visibility: TypeVisibility::parse(value).unwrap_or_default(),
        }
    }

    pub fn visibility(&self) -> TypeVisibility {
        self.visibility
    }
}

impl CodeTransformer for SetTypeVisibility {
    fn name(&self) -> &str {
        "SetTypeVisibility"
    }

    fn process_generated_code(
        &mut self,
        _context: &GenerationContext<'_>,
        document: &mut CodeDocument,
    ) -> Result<(), TransformerError> {
        document.class.visibility = self.visibility;
        Ok(())
    }
}

/// Overrides the namespace of the generated class.
pub struct SetNamespace {
    namespace: String,
}

impl SetNamespace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl CodeTransformer for SetNamespace {
    fn name(&self) -> &str {
        "SetNamespace"
    }

    fn initialize(
        &mut self,
        config: &mut HostConfig,
        _directives: &Directives,
    ) -> Result<(), TransformerError> {
        if !is_namespace(&self.namespace) {
            return Err(TransformerError::new(
                self.name(),
                format!("'{}' is not a valid namespace", self.namespace),
            ));
        }
        config.default_namespace = self.namespace.clone();
        Ok(())
    }
}

/// Appends a suffix to the generated class name.
pub struct SetClassSuffix {
    suffix: String,
}

impl SetClassSuffix {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl CodeTransformer for SetClassSuffix {
    fn name(&self) -> &str {
        "SetClassSuffix"
    }

    fn initialize(
        &mut self,
        config: &mut HostConfig,
        _directives: &Directives,
    ) -> Result<(), TransformerError> {
        let name = format!("{}{}", config.default_class_name, self.suffix);
        if !is_identifier(&name) {
            return Err(TransformerError::new(
                self.name(),
                format!("suffix '{}' does not form a valid class name", self.suffix),
            ));
        }
        config.default_class_name = name;
        Ok(())
    }
}

/// Turns the page class into a helper container: helpers become static
/// methods, and the page constructor and `Execute` body are dropped.
#[derive(Default)]
pub struct MakeTypeHelper;

impl MakeTypeHelper {
    pub fn new() -> Self {
        Self
    }
}

impl CodeTransformer for MakeTypeHelper {
    fn name(&self) -> &str {
        "MakeTypeHelper"
    }

    fn initialize(
        &mut self,
        config: &mut HostConfig,
        _directives: &Directives,
    ) -> Result<(), TransformerError> {
        config.static_helpers = true;
        Ok(())
    }

    fn process_generated_code(
        &mut self,
        _context: &GenerationContext<'_>,
        document: &mut CodeDocument,
    ) -> Result<(), TransformerError> {
        document.class.remove_constructors();
        document.class.remove_method(EXECUTE_METHOD);
        Ok(())
    }
}
