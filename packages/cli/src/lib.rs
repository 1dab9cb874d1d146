#![deny(clippy::all)]

/**
 * Razor Generator CLI
 *
 * Batch front end over the core host manager: expands input globs, derives
 * namespaces from folders, writes one `.cs` file per template plus a manifest
 * of everything generated.
 */

pub mod batch;
pub mod config;

pub use batch::{run_batch, BatchOptions, GeneratedFile, GeneratedFilesManifest};
pub use config::ProjectConfig;
