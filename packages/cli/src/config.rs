use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Project configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "razorgen.json";

/// Contents of `razorgen.json`. Every field is optional; command-line flags
/// take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    pub root_namespace: Option<String>,
    pub output_dir: Option<String>,
    /// `v1` or `v2`.
    pub runtime: Option<String>,
    pub load_extensions: Option<bool>,
    pub plugin_dir: Option<String>,
    pub parallel: Option<bool>,
    /// Input globs relative to the project root.
    pub files: Vec<String>,
    /// Namespace overrides keyed by project-relative path (`/` separated).
    pub namespaces: HashMap<String, String>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ProjectConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// `razorgen.json` from `project_root`, or defaults when there is none.
    pub fn load_from_root(project_root: &Path) -> anyhow::Result<Self> {
        let path = project_root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}
