//! Host
//!
//! Per-file orchestrator. A host reads its template, picks the code
//! transformer, lets it configure the engine, runs the engine and then the
//! remaining pipeline points, and returns the emitted source text. It never
//! writes files.

use crate::code::CSharpEmitter;
use crate::config::HostConfig;
use crate::directives::{DirectiveParseWarning, DirectiveParser};
use crate::engine::{ParserError, TemplateSource};
use crate::error::HostError;
use crate::host_manager::HostManager;
use crate::transformers::GenerationContext;
use std::path::{Path, PathBuf};

enum Input {
    File(PathBuf),
    Source(String),
}

type ErrorSink<'m> = Box<dyn FnMut(&ParserError) + 'm>;

/// Generates code for one template. Borrows the manager that created it.
pub struct Host<'m> {
    manager: &'m HostManager,
    input: Input,
    project_relative_path: String,
    config: HostConfig,
    error_sinks: Vec<ErrorSink<'m>>,
    errors: Vec<ParserError>,
    warnings: Vec<DirectiveParseWarning>,
}

impl<'m> Host<'m> {
    pub(crate) fn for_file(
        manager: &'m HostManager,
        input_path: PathBuf,
        project_relative_path: &str,
    ) -> Self {
        Self::new(manager, Input::File(input_path), project_relative_path)
    }

    pub(crate) fn for_source(
        manager: &'m HostManager,
        contents: String,
        project_relative_path: &str,
    ) -> Self {
        Self::new(manager, Input::Source(contents), project_relative_path)
    }

    fn new(manager: &'m HostManager, input: Input, project_relative_path: &str) -> Self {
        Self {
            manager,
            input,
            project_relative_path: project_relative_path.to_string(),
            config: HostConfig::for_file(project_relative_path),
            error_sinks: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn project_relative_path(&self) -> &str {
        &self.project_relative_path
    }

    /// Path of the input file, when the host was created from one.
    pub fn input_path(&self) -> Option<&Path> {
        match &self.input {
            Input::File(path) => Some(path),
            Input::Source(_) => None,
        }
    }

    /// Configuration before any transformer has run.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut HostConfig {
        &mut self.config
    }

    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.config.default_namespace = namespace.into();
    }

    pub fn set_default_class_name(&mut self, class_name: impl Into<String>) {
        self.config.default_class_name = class_name.into();
    }

    pub fn set_enable_line_pragmas(&mut self, enabled: bool) {
        self.config.enable_line_pragmas = enabled;
    }

    /// Register a callback invoked for every template error found by
    /// `generate_code`.
    pub fn on_error<F>(&mut self, sink: F)
    where
        F: FnMut(&ParserError) + 'm,
    {
        self.error_sinks.push(Box::new(sink));
    }

    /// Template errors from the last `generate_code` call.
    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    /// Directive warnings from the last `generate_code` call.
    pub fn warnings(&self) -> &[DirectiveParseWarning] {
        &self.warnings
    }

    fn file_name(&self) -> String {
        match &self.input {
            Input::File(path) => path.display().to_string(),
            Input::Source(_) => self.project_relative_path.clone(),
        }
    }

    fn read_source(&self) -> Result<String, HostError> {
        let contents = match &self.input {
            Input::File(path) => std::fs::read_to_string(path).map_err(|source| HostError::Io {
                path: path.clone(),
                source,
            })?,
            Input::Source(contents) => contents.clone(),
        };
        Ok(match contents.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => contents,
        })
    }

    /// Run the whole pipeline and return the generated source text.
    ///
    /// Template errors do not stop generation: they are passed to the
    /// `on_error` callbacks, kept in [`Host::errors`], and returned as
    /// [`HostError::Template`] together with the text generated anyway.
    pub fn generate_code(&mut self) -> Result<String, HostError> {
        self.errors.clear();
        self.warnings.clear();

        let logger = self.manager.logger();
        let contents = self.read_source()?;

        let directives = DirectiveParser::parse(&contents);
        for warning in directives.warnings() {
            logger.warn(&format!("{}: {}", self.project_relative_path, warning));
        }
        self.warnings.extend_from_slice(directives.warnings());

        let transformer_name = self
            .manager
            .transformer_name_for(&directives, &self.project_relative_path);
        logger.debug(&format!(
            "{}: using code transformer '{}'",
            self.project_relative_path, transformer_name
        ));
        let mut transformer = self.manager.registry().resolve(&transformer_name)?;

        let mut config = self.config.clone();
        transformer.initialize(&mut config, &directives)?;

        let engine = self.manager.engine();
        let source = TemplateSource {
            file_name: self.file_name(),
            project_relative_path: self.project_relative_path.clone(),
            contents,
        };
        let results = engine.generate(&config, &source)?;
        let mut document = results.document;

        let engine_version = engine.version().to_string();
        let context = GenerationContext {
            project_relative_path: &self.project_relative_path,
            engine_version: &engine_version,
            config: &config,
            directives: &directives,
        };
        transformer.process_generated_code(&context, &mut document)?;

        let text = CSharpEmitter::new(engine.runtime_version()).emit(&document);
        let output = transformer.process_output(text)?;

        if results.errors.is_empty() {
            return Ok(output);
        }

        for error in &results.errors {
            logger.error(&format!("{}{}", self.project_relative_path, error));
            for sink in &mut self.error_sinks {
                sink(error);
            }
        }
        self.errors = results.errors.clone();
        Err(HostError::Template {
            errors: results.errors,
            partial_output: output,
        })
    }
}
