//! Version
//!
//! Version information for the generator and for the template engine builds
//! it can host.

/// Generator version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tool name recorded in generated-code markers.
pub const TOOL_NAME: &str = "RazorGenerator";

/// Generator version string.
pub fn version_string() -> String {
    format!("Razor Generator v{}", VERSION)
}

/// Four-part assembly-style version (`major.minor.build.revision`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Build number.
    pub build: u32,
    /// Revision number.
    pub revision: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parse a dotted version with two to four numeric parts. Missing parts are zero.
    pub fn parse(version: &str) -> Option<Self> {
        let nums: Vec<&str> = version.trim().split('.').collect();
        if nums.len() < 2 || nums.len() > 4 {
            return None;
        }

        let part = |index: usize| -> Option<u32> {
            match nums.get(index) {
                Some(n) => n.parse().ok(),
                None => Some(0),
            }
        };

        Some(Self {
            major: part(0)?,
            minor: part(1)?,
            build: part(2)?,
            revision: part(3)?,
        })
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}
