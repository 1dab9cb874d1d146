use super::{
    AddGeneratedClassAttribute, AddPageVirtualPathAttribute, AggregateTransformer,
    CodeTransformer, DirectivesBasedTransformers, GenerationContext, SetBaseType, SetImports,
};
use crate::code::CodeDocument;
use crate::config::{CodeGeneratorStrategy, HostConfig, ParserStrategy};
use crate::directives::Directives;
use crate::error::TransformerError;

pub const MVC_NAMESPACES: [&str; 2] = ["System.Web.Mvc", "System.Web.Mvc.Html"];
pub const MVC_VIEW_BASE_CLASS: &str = "System.Web.Mvc.WebViewPage";
/// View start pages run before every view and never take a model.
pub const VIEW_START_PAGE_NAME: &str = "_ViewStart";
const DEFAULT_MODEL_TYPE_NAME: &str = "dynamic";

/// The MVC view preset.
///
/// Besides composing the built-ins it switches the engine to the MVC parser
/// (`@model`) and to the MVC code generator, which parameterises the base
/// class with the model type.
pub struct MvcViewTransformer {
    inner: AggregateTransformer,
}

impl MvcViewTransformer {
    pub fn new() -> Self {
        Self {
            inner: AggregateTransformer::new(
                super::MVC_VIEW_TRANSFORMER,
                vec![
                    Box::new(DirectivesBasedTransformers::new()),
                    Box::new(AddGeneratedClassAttribute::new()),
                    Box::new(AddPageVirtualPathAttribute::new()),
                    Box::new(SetImports::new(MVC_NAMESPACES, false)),
                    Box::new(SetBaseType::new(MVC_VIEW_BASE_CLASS)),
                ],
            ),
        }
    }
}

impl Default for MvcViewTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeTransformer for MvcViewTransformer {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn initialize(
        &mut self,
        config: &mut HostConfig,
        directives: &Directives,
    ) -> Result<(), TransformerError> {
        self.inner.initialize(config, directives)?;

        config.code_generator = CodeGeneratorStrategy::MvcView {
            default_model_type: DEFAULT_MODEL_TYPE_NAME.to_string(),
            special_page_name: VIEW_START_PAGE_NAME.to_string(),
        };
        config.parser = ParserStrategy::Mvc;
        Ok(())
    }

    fn process_generated_code(
        &mut self,
        context: &GenerationContext<'_>,
        document: &mut CodeDocument,
    ) -> Result<(), TransformerError> {
        self.inner.process_generated_code(context, document)
    }

    fn process_output(&mut self, source: String) -> Result<String, TransformerError> {
        self.inner.process_output(source)
    }
}
