//! Transformer Plugins
//!
//! Externally supplied transformers. A plugin is anything implementing
//! [`TransformerPlugin`]; the host manager also discovers declarative plugins
//! from `*.transformer.json` manifests in its plugin directory. A manifest names
//! a new transformer and lists the built-in steps it is composed of:
//!
//! ```json
//! {
//!   "name": "HelperPage",
//!   "steps": [
//!     { "kind": "preset", "name": "Template" },
//!     { "kind": "setImports", "imports": ["System.Web"], "replaceExisting": false },
//!     { "kind": "setTypeVisibility", "visibility": "internal" }
//!   ]
//! }
//! ```

use crate::error::{HostManagerError, RegistryError};
use crate::registry::{TransformerFactory, TransformerRegistry};
use crate::transformers::{
    AddGeneratedClassAttribute, AddPageVirtualPathAttribute, AggregateTransformer,
    CodeTransformer, DirectivesBasedTransformers, MakeTypeHelper, SetBaseType, SetImports,
    SetTypeVisibility,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name suffix of declarative plugin manifests.
pub const MANIFEST_SUFFIX: &str = ".transformer.json";

/// Capability implemented by externally supplied transformer sets.
pub trait TransformerPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Add this plugin's transformers to `registry`.
    fn register(&self, registry: &mut TransformerRegistry) -> Result<(), RegistryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerManifest {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<ManifestStep>,
}

/// One child of a manifest transformer, in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ManifestStep {
    /// An already registered transformer, usually a built-in preset.
    Preset { name: String },
    #[serde(rename_all = "camelCase")]
    SetBaseType { type_name: String },
    #[serde(rename_all = "camelCase")]
    SetImports {
        imports: Vec<String>,
        #[serde(default)]
        replace_existing: bool,
    },
    AddGeneratedClassAttribute,
    AddPageVirtualPathAttribute,
    SetTypeVisibility { visibility: String },
    MakeTypeHelper,
    Directives,
}

impl ManifestStep {
    fn factory(&self, registry: &TransformerRegistry) -> Result<TransformerFactory, RegistryError> {
        let factory: TransformerFactory = match self.clone() {
            ManifestStep::Preset { name } => return registry.factory(&name),
            ManifestStep::SetBaseType { type_name } => {
                Arc::new(move || -> Box<dyn CodeTransformer> {
                    Box::new(SetBaseType::new(type_name.clone()))
                })
            }
            ManifestStep::SetImports {
                imports,
                replace_existing,
            } => Arc::new(move || -> Box<dyn CodeTransformer> {
                Box::new(SetImports::new(imports.iter().cloned(), replace_existing))
            }),
            ManifestStep::AddGeneratedClassAttribute => {
                Arc::new(|| -> Box<dyn CodeTransformer> { Box::new(AddGeneratedClassAttribute::new()) })
            }
            ManifestStep::AddPageVirtualPathAttribute => {
                Arc::new(|| -> Box<dyn CodeTransformer> { Box::new(AddPageVirtualPathAttribute::new()) })
            }
            ManifestStep::SetTypeVisibility { visibility } => {
                Arc::new(move || -> Box<dyn CodeTransformer> {
                    Box::new(SetTypeVisibility::new(&visibility))
                })
            }
            ManifestStep::MakeTypeHelper => {
                Arc::new(|| -> Box<dyn CodeTransformer> { Box::new(MakeTypeHelper::new()) })
            }
            ManifestStep::Directives => {
                Arc::new(|| -> Box<dyn CodeTransformer> { Box::new(DirectivesBasedTransformers::new()) })
            }
        };
        Ok(factory)
    }
}

/// A plugin read from a `*.transformer.json` manifest.
#[derive(Debug, Clone)]
pub struct ManifestPlugin {
    path: PathBuf,
    manifest: TransformerManifest,
}

impl ManifestPlugin {
    pub fn new(path: impl Into<PathBuf>, manifest: TransformerManifest) -> Self {
        Self {
            path: path.into(),
            manifest,
        }
    }

    pub fn load(path: &Path) -> Result<Self, HostManagerError> {
        let plugin_error = |message: String| HostManagerError::Plugin {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| plugin_error(e.to_string()))?;
        let manifest: TransformerManifest =
            serde_json::from_str(&content).map_err(|e| plugin_error(e.to_string()))?;
        if manifest.name.trim().is_empty() {
            return Err(plugin_error("manifest has an empty transformer name".to_string()));
        }
        Ok(Self::new(path, manifest))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest(&self) -> &TransformerManifest {
        &self.manifest
    }
}

impl TransformerPlugin for ManifestPlugin {
    fn name(&self) -> &str {
        &self.manifest.name
    }

    fn register(&self, registry: &mut TransformerRegistry) -> Result<(), RegistryError> {
        let steps = self
            .manifest
            .steps
            .iter()
            .map(|step| step.factory(registry))
            .collect::<Result<Vec<_>, _>>()?;

        let name = self.manifest.name.clone();
        registry.register(&self.manifest.name, move || -> Box<dyn CodeTransformer> {
            Box::new(AggregateTransformer::new(
                name.clone(),
                steps.iter().map(|step| step()).collect(),
            ))
        })
    }
}

/// Manifests in `directory`, sorted by path. A missing directory has none.
pub fn discover_plugins(directory: &Path) -> Result<Vec<ManifestPlugin>, HostManagerError> {
    if !directory.is_dir() {
        return Ok(Vec::new());
    }

    let pattern = format!(
        "{}/*{}",
        glob::Pattern::escape(&directory.to_string_lossy()),
        MANIFEST_SUFFIX
    );
    let entries = glob::glob(&pattern).map_err(|e| HostManagerError::Plugin {
        path: directory.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut paths: Vec<PathBuf> = entries.filter_map(Result::ok).collect();
    paths.sort();
    paths.iter().map(|path| ManifestPlugin::load(path)).collect()
}
