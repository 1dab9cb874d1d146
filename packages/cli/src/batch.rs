//! Batch Generation
//!
//! Generates code for a set of templates with one shared host manager. Each
//! template becomes `<output dir>/<project-relative path>.cs`; the first failing
//! template aborts the batch.

use crate::config::ProjectConfig;
use anyhow::Context;
use rayon::prelude::*;
use razor_generator_core::logging::Logger;
use razor_generator_core::{HostManager, RuntimeVersion};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Output directory, relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "obj/CodeGen";
/// Written into the output directory after a successful batch.
pub const MANIFEST_FILE_NAME: &str = "generated-files.json";
/// Inputs used when neither the command line nor the config names any.
pub const DEFAULT_INPUT_PATTERN: &str = "**/*.cshtml";

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub project_root: PathBuf,
    pub root_namespace: Option<String>,
    /// Absolute, or relative to `project_root`.
    pub output_dir: PathBuf,
    pub runtime: RuntimeVersion,
    pub load_extensions: bool,
    pub plugin_directory: Option<PathBuf>,
    pub parallel: bool,
    /// Namespace overrides keyed by project-relative path.
    pub namespaces: HashMap<String, String>,
}

impl BatchOptions {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            root_namespace: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            runtime: RuntimeVersion::default(),
            load_extensions: false,
            plugin_directory: None,
            parallel: false,
            namespaces: HashMap::new(),
        }
    }

    /// Options for `project_root` with the values from `config` applied.
    pub fn from_config(
        project_root: impl Into<PathBuf>,
        config: &ProjectConfig,
    ) -> anyhow::Result<Self> {
        let mut options = Self::new(project_root);
        options.root_namespace = config.root_namespace.clone();
        if let Some(dir) = &config.output_dir {
            options.output_dir = PathBuf::from(dir);
        }
        if let Some(runtime) = &config.runtime {
            options.runtime = runtime.parse().map_err(anyhow::Error::msg)?;
        }
        options.load_extensions = config.load_extensions.unwrap_or(false);
        options.plugin_directory = config.plugin_dir.as_ref().map(PathBuf::from);
        options.parallel = config.parallel.unwrap_or(false);
        options.namespaces = config.namespaces.clone();
        Ok(options)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    pub fn output_directory(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFile {
    /// Template path relative to the project root.
    pub source: String,
    pub output: PathBuf,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFilesManifest {
    pub output_directory: PathBuf,
    pub files: Vec<GeneratedFile>,
}

/// Expand `patterns` (relative ones against `project_root`) into a sorted,
/// deduplicated file list.
pub fn expand_inputs(project_root: &Path, patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let full = if Path::new(pattern).is_absolute() {
            pattern.clone()
        } else {
            format!(
                "{}/{}",
                glob::Pattern::escape(&project_root.to_string_lossy()),
                pattern
            )
        };
        let entries =
            glob::glob(&full).with_context(|| format!("invalid input pattern '{}'", pattern))?;
        for entry in entries {
            let path = entry?;
            if path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// `file` relative to `project_root`, `/` separated. Files outside the root
/// keep their full path.
pub fn project_relative_path(file: &Path, project_root: &Path) -> String {
    let relative = file.strip_prefix(project_root).unwrap_or(file);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Namespace for a template: an explicit override, else the root namespace
/// followed by the template's folders. `None` keeps the host default.
pub fn namespace_for(
    project_relative_path: &str,
    root_namespace: Option<&str>,
    overrides: &HashMap<String, String>,
) -> Option<String> {
    if let Some(namespace) = overrides.get(project_relative_path) {
        return Some(namespace.clone());
    }

    let mut parts: Vec<String> = root_namespace
        .map(str::trim)
        .filter(|ns| !ns.is_empty())
        .map(|ns| ns.to_string())
        .into_iter()
        .collect();

    let mut folders: Vec<&str> = project_relative_path
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .collect();
    folders.pop();
    parts.extend(folders.into_iter().map(namespace_segment));

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}

fn namespace_segment(folder: &str) -> String {
    let mut segment: String = folder
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if segment.starts_with(|c: char| c.is_ascii_digit()) {
        segment.insert(0, '_');
    }
    segment
}

/// `<output_dir>/<project-relative path>.cs`.
pub fn output_path(output_dir: &Path, project_relative_path: &str) -> PathBuf {
    output_dir.join(format!("{}.cs", project_relative_path))
}

fn generate_file(
    manager: &HostManager,
    options: &BatchOptions,
    output_dir: &Path,
    file: &Path,
) -> anyhow::Result<GeneratedFile> {
    let relative = project_relative_path(file, &options.project_root);
    let namespace = namespace_for(
        &relative,
        options.root_namespace.as_deref(),
        &options.namespaces,
    );

    let mut host = manager.create_host(file, &relative);
    if let Some(namespace) = &namespace {
        host.set_default_namespace(namespace.clone());
    }
    let code = host
        .generate_code()
        .with_context(|| format!("failed to generate code for '{}'", relative))?;

    let output = output_path(output_dir, &relative);
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }
    fs::write(&output, code).with_context(|| format!("failed to write '{}'", output.display()))?;
    manager
        .logger()
        .debug(&format!("{} -> {}", relative, output.display()));

    Ok(GeneratedFile {
        source: relative,
        output,
        namespace,
    })
}

/// Generate every file in `inputs` and write the manifest. Nothing is written
/// for an empty input list.
pub fn run_batch(
    options: &BatchOptions,
    inputs: &[PathBuf],
    logger: Arc<dyn Logger>,
) -> anyhow::Result<GeneratedFilesManifest> {
    let output_directory = options.output_directory();
    if inputs.is_empty() {
        logger.info("no templates to generate");
        return Ok(GeneratedFilesManifest {
            output_directory,
            files: Vec::new(),
        });
    }

    let start = Instant::now();
    let mut builder = HostManager::builder(&options.project_root)
        .runtime(options.runtime)
        .load_extensions(options.load_extensions)
        .logger(Arc::clone(&logger));
    if let Some(dir) = &options.plugin_directory {
        builder = builder.plugin_directory(options.resolve(dir));
    }
    let manager = builder.build()?;

    let files = if options.parallel {
        inputs
            .par_iter()
            .map(|file| generate_file(&manager, options, &output_directory, file))
            .collect::<anyhow::Result<Vec<_>>>()?
    } else {
        inputs
            .iter()
            .map(|file| generate_file(&manager, options, &output_directory, file))
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    let manifest = GeneratedFilesManifest {
        output_directory,
        files,
    };
    let manifest_path = manifest.output_directory.join(MANIFEST_FILE_NAME);
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("failed to write '{}'", manifest_path.display()))?;

    logger.info(&format!(
        "generated {} file(s) with Razor {} in {:?}",
        manifest.files.len(),
        manager.runtime(),
        start.elapsed()
    ));
    Ok(manifest)
}
