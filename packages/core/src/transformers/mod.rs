//! Code Transformers
//!
//! A code transformer adapts generation for one consumer framework. The host
//! drives three pipeline points per file, always in this order:
//!
//! 1. [`CodeTransformer::initialize`] with the mutable host configuration,
//!    before any code exists;
//! 2. [`CodeTransformer::process_generated_code`] with the document the
//!    template engine produced;
//! 3. [`CodeTransformer::process_output`] with the emitted source text.
//!
//! An `Err` from any point aborts the rest of the pipeline for that file.

mod aggregate;
mod builtin;
mod directives_based;
mod mvc_view;
mod template;
mod web_pages;

pub use aggregate::AggregateTransformer;
pub use builtin::{
    AddGeneratedClassAttribute, AddPageVirtualPathAttribute, MakeTypeHelper, SetBaseType,
    SetClassSuffix, SetImports, SetNamespace, SetTypeVisibility, GENERATED_CODE_ATTRIBUTE,
    PAGE_VIRTUAL_PATH_ATTRIBUTE,
};
pub use directives_based::DirectivesBasedTransformers;
pub use mvc_view::{MvcViewTransformer, MVC_NAMESPACES, MVC_VIEW_BASE_CLASS, VIEW_START_PAGE_NAME};
pub use template::{TemplateCodeTransformer, TEMPLATE_IMPORTS};
pub use web_pages::{
    mvc_helper_transformer, web_page_helper_transformer, web_page_transformer,
    HELPER_PAGE_BASE_CLASS, WEB_PAGE_BASE_CLASS, WEB_PAGE_NAMESPACES,
};

use crate::code::CodeDocument;
use crate::config::HostConfig;
use crate::directives::Directives;
use crate::error::TransformerError;

/// Registry name of the generic template preset.
pub const TEMPLATE_TRANSFORMER: &str = "Template";
/// Registry name of the MVC view preset.
pub const MVC_VIEW_TRANSFORMER: &str = "MvcView";
/// Registry name of the web page preset.
pub const WEB_PAGE_TRANSFORMER: &str = "WebPage";
/// Registry name of the web page helper library preset.
pub const WEB_PAGE_HELPER_TRANSFORMER: &str = "WebPageHelper";
/// Registry name of the MVC helper library preset.
pub const MVC_HELPER_TRANSFORMER: &str = "MvcHelper";

/// Read-only facts about the file being generated.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    /// Path of the template relative to the project root.
    pub project_relative_path: &'a str,
    /// Version string of the template engine that produced the document.
    pub engine_version: &'a str,
    /// Configuration as left by `initialize`.
    pub config: &'a HostConfig,
    pub directives: &'a Directives,
}

/// A unit of mutation applied at the three pipeline points.
pub trait CodeTransformer {
    /// Name used in error messages.
    fn name(&self) -> &str;

    /// Adjust the host configuration. The document does not exist yet.
    fn initialize(
        &mut self,
        _config: &mut HostConfig,
        _directives: &Directives,
    ) -> Result<(), TransformerError> {
        Ok(())
    }

    /// Mutate the generated document in place.
    fn process_generated_code(
        &mut self,
        _context: &GenerationContext<'_>,
        _document: &mut CodeDocument,
    ) -> Result<(), TransformerError> {
        Ok(())
    }

    /// Final text-level pass. Identity by default.
    fn process_output(&mut self, source: String) -> Result<String, TransformerError> {
        Ok(source)
    }
}

impl<T: CodeTransformer + ?Sized> CodeTransformer for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn initialize(
        &mut self,
        config: &mut HostConfig,
        directives: &Directives,
    ) -> Result<(), TransformerError> {
        (**self).initialize(config, directives)
    }

    fn process_generated_code(
        &mut self,
        context: &GenerationContext<'_>,
        document: &mut CodeDocument,
    ) -> Result<(), TransformerError> {
        (**self).process_generated_code(context, document)
    }

    fn process_output(&mut self, source: String) -> Result<String, TransformerError> {
        (**self).process_output(source)
    }
}
