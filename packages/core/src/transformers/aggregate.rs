use super::{CodeTransformer, GenerationContext};
use crate::code::CodeDocument;
use crate::config::HostConfig;
use crate::directives::Directives;
use crate::error::TransformerError;

/// Ordered composite of code transformers.
///
/// Each pipeline point runs on every child in list order, so a later child sees
/// (and may overwrite) what an earlier one did. The first failing child stops
/// the remaining children.
pub struct AggregateTransformer {
    name: String,
    children: Vec<Box<dyn CodeTransformer>>,
}

impl AggregateTransformer {
    pub fn new(name: impl Into<String>, children: Vec<Box<dyn CodeTransformer>>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    pub fn children(&self) -> &[Box<dyn CodeTransformer>] {
        &self.children
    }
}

impl CodeTransformer for AggregateTransformer {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(
        &mut self,
        config: &mut HostConfig,
        directives: &Directives,
    ) -> Result<(), TransformerError> {
        for child in &mut self.children {
            child.initialize(config, directives)?;
        }
        Ok(())
    }

    fn process_generated_code(
        &mut self,
        context: &GenerationContext<'_>,
        document: &mut CodeDocument,
    ) -> Result<(), TransformerError> {
        for child in &mut self.children {
            child.process_generated_code(context, document)?;
        }
        Ok(())
    }

    fn process_output(&mut self, source: String) -> Result<String, TransformerError> {
        self.children
            .iter_mut()
            .try_fold(source, |text, child| child.process_output(text))
    }
}
