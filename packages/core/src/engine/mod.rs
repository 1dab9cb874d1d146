//! Template Engine
//!
//! The engine parses template markup and builds the initial `CodeDocument`.
//! Two incompatible major versions exist; each is a separate backend behind
//! the [`TemplateEngine`] interface, and a host manager loads exactly one of
//! them through an [`EngineBoundary`].

mod boundary;
mod generator;
mod parser;
#[cfg(feature = "runtime-v1")]
mod v1;
#[cfg(feature = "runtime-v2")]
mod v2;

pub use boundary::{available_runtimes, EngineBoundary};
pub use generator::{is_special_page, EXECUTE_METHOD};
pub use parser::{MarkupNode, MarkupParser, SourceLocation};

#[cfg(feature = "runtime-v1")]
pub use v1::RazorEngineV1;
#[cfg(feature = "runtime-v2")]
pub use v2::RazorEngineV2;

use crate::code::CodeDocument;
use crate::config::HostConfig;
use crate::error::TemplateEngineError;
use crate::version::Version;
use std::fmt;
use std::str::FromStr;

/// Major version of the template engine a host manager runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum RuntimeVersion {
    V1,
    #[default]
    V2,
}

impl RuntimeVersion {
    pub const ALL: [RuntimeVersion; 2] = [RuntimeVersion::V1, RuntimeVersion::V2];

    pub fn major(self) -> u32 {
        match self {
            RuntimeVersion::V1 => 1,
            RuntimeVersion::V2 => 2,
        }
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.major())
    }
}

impl FromStr for RuntimeVersion {
    type Err = String;

    /// Accepts `1`, `v1`, `version1` (any case) and the same for 2.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let digits = lowered
            .strip_prefix("version")
            .or_else(|| lowered.strip_prefix('v'))
            .unwrap_or(&lowered);
        match digits {
            "1" => Ok(RuntimeVersion::V1),
            "2" => Ok(RuntimeVersion::V2),
            _ => Err(format!("unknown Razor runtime version '{}'", s)),
        }
    }
}

/// Template text plus the paths it is known by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    /// Path written into line pragmas.
    pub file_name: String,
    /// Path relative to the project root.
    pub project_relative_path: String,
    pub contents: String,
}

/// Markup error; reported per file, generation continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserError {
    pub message: String,
    pub location: SourceLocation,
}

impl ParserError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{}): {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for ParserError {}

/// Document produced for one template and the markup errors found on the way.
#[derive(Debug, Clone)]
pub struct GeneratorResults {
    pub document: CodeDocument,
    pub errors: Vec<ParserError>,
}

impl GeneratorResults {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Narrow interface every engine backend implements.
pub trait TemplateEngine: Send + Sync {
    /// Major version this backend implements.
    fn runtime(&self) -> RuntimeVersion;

    /// Engine build version, recorded in generated-code markers.
    fn version(&self) -> Version;

    /// Runtime version written into the auto-generated header.
    fn runtime_version(&self) -> &str;

    /// Parse `source` and build the initial document as configured by `config`.
    fn generate(
        &self,
        config: &HostConfig,
        source: &TemplateSource,
    ) -> Result<GeneratorResults, TemplateEngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_runtime_version_spellings() {
        assert_eq!("1".parse::<RuntimeVersion>(), Ok(RuntimeVersion::V1));
        assert_eq!("V2".parse::<RuntimeVersion>(), Ok(RuntimeVersion::V2));
        assert_eq!("Version1".parse::<RuntimeVersion>(), Ok(RuntimeVersion::V1));
        assert!("3".parse::<RuntimeVersion>().is_err());
        assert!("".parse::<RuntimeVersion>().is_err());
    }

    #[test]
    fn should_display_runtime_version() {
        assert_eq!(RuntimeVersion::V1.to_string(), "v1");
        assert_eq!(RuntimeVersion::V2.major(), 2);
    }
}
