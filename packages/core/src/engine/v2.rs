//! Second-generation Razor engine.
//!
//! Generates the same document shape as the first generation and additionally
//! resolves application-relative (`~/`) URLs in `href`, `src` and `action`
//! attributes at render time.

use super::generator::{self, GeneratorOptions};
use super::{GeneratorResults, RuntimeVersion, TemplateEngine, TemplateSource};
use crate::config::HostConfig;
use crate::error::TemplateEngineError;
use crate::version::Version;

pub const ENGINE_VERSION: Version = Version::new(2, 0, 0, 0);
const RUNTIME_VERSION: &str = "4.0.30319.17929";

#[derive(Debug, Default)]
pub struct RazorEngineV2;

impl RazorEngineV2 {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateEngine for RazorEngineV2 {
    fn runtime(&self) -> RuntimeVersion {
        RuntimeVersion::V2
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
        generator::generate(
            config,
            source,
            GeneratorOptions {
                resolve_virtual_urls: true,
            },
        )
    }
}
