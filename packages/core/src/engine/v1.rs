//! First-generation Razor engine.

use super::generator::{self, GeneratorOptions};
use super::{GeneratorResults, RuntimeVersion, TemplateEngine, TemplateSource};
use crate::config::HostConfig;
use crate::error::TemplateEngineError;
use crate::version::Version;

pub const ENGINE_VERSION: Version = Version::new(1, 0, 0, 0);
const RUNTIME_VERSION: &str = "4.0.30319.1";

#[derive(Debug, Default)]
pub struct RazorEngineV1;

impl RazorEngineV1 {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateEngine for RazorEngineV1 {
    fn runtime(&self) -> RuntimeVersion {
        RuntimeVersion::V1
    }

    fn version(&self) -> Version {
        ENGINE_VERSION
    }

    fn runtime_version(&self) -> &str {
        RUNTIME_VERSION
    }

    fn generate(
        &self,
        config: &HostConfig,
        source: &TemplateSource,
    ) -> Result<GeneratorResults, TemplateEngineError> {
        generator::generate(config, source, GeneratorOptions::default())
    }
}
