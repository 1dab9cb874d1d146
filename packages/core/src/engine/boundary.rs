//! Isolation Boundary
//!
//! A host manager talks to exactly one engine backend through an
//! `EngineBoundary`. The boundary owns the backend for the manager's whole
//! lifetime; hosts borrow the manager, so none can outlive it.

use super::{RuntimeVersion, TemplateEngine};
use crate::error::IsolationBoundaryError;
use crate::logging::Logger;
use std::sync::Arc;

/// Runtimes compiled into this build.
pub fn available_runtimes() -> Vec<RuntimeVersion> {
    RuntimeVersion::ALL
        .into_iter()
        .filter(|runtime| instantiate(*runtime).is_some())
        .collect()
}

fn instantiate(runtime: RuntimeVersion) -> Option<Box<dyn TemplateEngine>> {
    match runtime {
        #[cfg(feature = "runtime-v1")]
        RuntimeVersion::V1 => Some(Box::new(super::RazorEngineV1::new())),
        #[cfg(feature = "runtime-v2")]
        RuntimeVersion::V2 => Some(Box::new(super::RazorEngineV2::new())),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

pub struct EngineBoundary {
    engine: Box<dyn TemplateEngine>,
    logger: Arc<dyn Logger>,
}

impl EngineBoundary {
    /// Load the backend for `runtime` and check that it reports the requested
    /// major version.
    pub fn load(
        runtime: RuntimeVersion,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, IsolationBoundaryError> {
        let engine = instantiate(runtime).ok_or(IsolationBoundaryError::Unavailable(runtime))?;

        let version = engine.version();
        if version.major != runtime.major() || engine.runtime() != runtime {
            return Err(IsolationBoundaryError::VersionMismatch {
                requested: runtime,
                found: version.to_string(),
            });
        }

        logger.debug(&format!(
            "loaded Razor engine {} (runtime {})",
            version,
            engine.runtime_version()
        ));
        Ok(Self { engine, logger })
    }

    pub fn runtime(&self) -> RuntimeVersion {
        self.engine.runtime()
    }

    pub fn engine(&self) -> &dyn TemplateEngine {
        self.engine.as_ref()
    }
}

impl Drop for EngineBoundary {
    fn drop(&mut self) {
        self.logger.debug(&format!(
            "unloading Razor engine {}",
            self.engine.version()
        ));
    }
}

impl std::fmt::Debug for EngineBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBoundary")
            .field("runtime", &self.runtime())
            .field("version", &self.engine.version())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NullLogger;

    #[test]
    #[cfg(all(feature = "runtime-v1", feature = "runtime-v2"))]
    fn should_list_both_runtimes() {
        assert_eq!(
            available_runtimes(),
            vec![RuntimeVersion::V1, RuntimeVersion::V2]
        );
    }

    #[test]
    #[cfg(feature = "runtime-v1")]
    fn should_load_requested_major_version() {
        let boundary = EngineBoundary::load(RuntimeVersion::V1, Arc::new(NullLogger)).unwrap();
        assert_eq!(boundary.runtime(), RuntimeVersion::V1);
        assert_eq!(boundary.engine().version().to_string(), "1.0.0.0");
    }

    #[test]
    #[cfg(not(feature = "runtime-v1"))]
    fn should_report_missing_runtime() {
        let err = EngineBoundary::load(RuntimeVersion::V1, Arc::new(NullLogger)).unwrap_err();
        assert_eq!(err, IsolationBoundaryError::Unavailable(RuntimeVersion::V1));
    }
}
