use super::{
    AggregateTransformer, CodeTransformer, GenerationContext, SetClassSuffix, SetNamespace,
    SetTypeVisibility,
};
use crate::code::CodeDocument;
use crate::config::HostConfig;
use crate::directives::{
    Directives, CLASS_SUFFIX_KEY, DISABLE_LINE_PRAGMAS_KEY, NAMESPACE_KEY, TYPE_VISIBILITY_KEY,
};
use crate::error::TransformerError;

const DIRECTIVES_BASED_TRANSFORMERS: &str = "DirectivesBasedTransformers";

/// Lets per-file directives override preset defaults.
///
/// Every `initialize` rebuilds the child list from that call's directive map;
/// the children then drive the remaining pipeline points like any aggregate.
pub struct DirectivesBasedTransformers {
    inner: AggregateTransformer,
}

impl DirectivesBasedTransformers {
    pub fn new() -> Self {
        Self {
            inner: AggregateTransformer::new(DIRECTIVES_BASED_TRANSFORMERS, Vec::new()),
        }
    }

    /// Transformers requested by `directives`, in a fixed order.
    pub fn build_children(directives: &Directives) -> Vec<Box<dyn CodeTransformer>> {
        let mut children: Vec<Box<dyn CodeTransformer>> = Vec::new();
        if let Some(namespace) = directives.get(NAMESPACE_KEY) {
            children.push(Box::new(SetNamespace::new(namespace)));
        }
        if let Some(suffix) = directives.get(CLASS_SUFFIX_KEY) {
            children.push(Box::new(SetClassSuffix::new(suffix)));
        }
        if let Some(visibility) = directives.get(TYPE_VISIBILITY_KEY) {
            children.push(Box::new(SetTypeVisibility::new(visibility)));
        }
        children
    }

    pub fn children(&self) -> &[Box<dyn CodeTransformer>] {
        self.inner.children()
    }
}

impl Default for DirectivesBasedTransformers {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeTransformer for DirectivesBasedTransformers {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn initialize(
        &mut self,
        config: &mut HostConfig,
        directives: &Directives,
    ) -> Result<(), TransformerError> {
        self.inner = AggregateTransformer::new(
            DIRECTIVES_BASED_TRANSFORMERS,
            Self::build_children(directives),
        );

        if directives.get_bool(DISABLE_LINE_PRAGMAS_KEY) == Some(true) {
            config.enable_line_pragmas = false;
        }

        self.inner.initialize(config, directives)
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
