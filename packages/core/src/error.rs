//! Errors
//!
//! Error kinds raised by the generation pipeline. Problems that belong to a
//! single file (`RegistryError`, `TransformerError`, `TemplateEngineError`,
//! template parse errors) surface as `HostError`; problems that make the whole
//! host manager unusable surface as `HostManagerError`.

use crate::engine::{ParserError, RuntimeVersion};
use std::path::PathBuf;
use thiserror::Error;

/// Transformer registration and lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a code transformer named '{0}' is already registered")]
    DuplicateTransformer(String),
    #[error("no code transformer named '{0}' is registered")]
    UnknownTransformer(String),
}

/// A transformer pipeline point failed. Aborts the remaining pipeline for the file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("code transformer '{transformer}' failed: {message}")]
pub struct TransformerError {
    pub transformer: String,
    pub message: String,
}

impl TransformerError {
    pub fn new(transformer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            transformer: transformer.into(),
            message: message.into(),
        }
    }
}

/// The template engine could not produce a document at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateEngineError {
    #[error("'{0}' is not a valid class name")]
    InvalidClassName(String),
    #[error("'{0}' is not a valid namespace")]
    InvalidNamespace(String),
    #[error("'{0}' is not a valid base type")]
    InvalidBaseType(String),
}

/// The requested engine build cannot be hosted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IsolationBoundaryError {
    #[error("Razor runtime {0} is not available in this build")]
    Unavailable(RuntimeVersion),
    #[error("Razor runtime {requested} was requested but the loaded engine reports version {found}")]
    VersionMismatch {
        requested: RuntimeVersion,
        found: String,
    },
}

/// Per-file generation failure.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to read template '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Resolution(#[from] RegistryError),
    #[error(transparent)]
    Transformer(#[from] TransformerError),
    #[error(transparent)]
    Engine(#[from] TemplateEngineError),
    #[error("{}", format_parser_errors(errors))]
    Template {
        errors: Vec<ParserError>,
        /// Text generated despite the errors, kept for diagnostics.
        partial_output: String,
    },
}

impl HostError {
    /// Parser errors carried by a `Template` failure, empty otherwise.
    pub fn parser_errors(&self) -> &[ParserError] {
        match self {
            HostError::Template { errors, .. } => errors,
            _ => &[],
        }
    }
}

fn format_parser_errors(errors: &[ParserError]) -> String {
    let mut message = format!("template has {} error(s)", errors.len());
    for error in errors {
        message.push_str("\n  ");
        message.push_str(&error.to_string());
    }
    message
}

/// Host manager construction failure.
#[derive(Debug, Error)]
pub enum HostManagerError {
    #[error(transparent)]
    Boundary(#[from] IsolationBoundaryError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("failed to load transformer plugin '{}': {message}", path.display())]
    Plugin { path: PathBuf, message: String },
}
