//! Batch Generation Tests
//!
//! Runs whole batches against temporary project trees.

use razor_generator_cli::batch::{expand_inputs, MANIFEST_FILE_NAME};
use razor_generator_cli::{run_batch, BatchOptions, ProjectConfig};
use razor_generator_core::logging::NullLogger;
use razor_generator_core::RuntimeVersion;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Views/Home/Index.cshtml", "<h1>@ViewBag.Title</h1>");
    write(dir.path(), "Mail/Welcome.cshtml", "Hello @name!");
    write(dir.path(), "Mail/notes.txt", "not a template");
    dir
}

fn options(dir: &TempDir) -> BatchOptions {
    let mut options = BatchOptions::new(dir.path());
    options.root_namespace = Some("Shop".to_string());
    options
}

#[test]
fn should_expand_globs_relative_to_root() {
    let dir = project();
    let inputs = expand_inputs(dir.path(), &["**/*.cshtml".to_string()]).unwrap();

    assert_eq!(
        inputs,
        vec![
            dir.path().join("Mail/Welcome.cshtml"),
            dir.path().join("Views/Home/Index.cshtml"),
        ]
    );
}

#[test]
fn should_write_one_file_per_template_and_manifest() {
    let dir = project();
    let options = options(&dir);
    let inputs = expand_inputs(dir.path(), &["**/*.cshtml".to_string()]).unwrap();

    let manifest = run_batch(&options, &inputs, Arc::new(NullLogger::new())).unwrap();

    let out = dir.path().join("obj/CodeGen");
    assert_eq!(manifest.output_directory, out);
    assert_eq!(manifest.files.len(), 2);
    assert_eq!(manifest.files[0].source, "Mail/Welcome.cshtml");
    assert_eq!(manifest.files[0].namespace.as_deref(), Some("Shop.Mail"));

    let mail = fs::read_to_string(out.join("Mail/Welcome.cshtml.cs")).unwrap();
    assert!(mail.contains("namespace Shop.Mail"));
    assert!(mail.contains("public partial class Welcome : WelcomeBase"));

    let view = fs::read_to_string(out.join("Views/Home/Index.cshtml.cs")).unwrap();
    assert!(view.contains("namespace Shop.Views.Home"));
    assert!(view.contains("System.Web.Mvc.WebViewPage<dynamic>"));

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(MANIFEST_FILE_NAME)).unwrap()).unwrap();
    assert_eq!(written["files"].as_array().unwrap().len(), 2);
    assert_eq!(written["files"][1]["source"], "Views/Home/Index.cshtml");
}

#[test]
fn should_match_sequential_output_in_parallel() {
    let dir = project();
    let inputs = expand_inputs(dir.path(), &["**/*.cshtml".to_string()]).unwrap();

    let mut sequential = options(&dir);
    sequential.output_dir = PathBuf::from("seq");
    let mut parallel = options(&dir);
    parallel.output_dir = PathBuf::from("par");
    parallel.parallel = true;

    run_batch(&sequential, &inputs, Arc::new(NullLogger::new())).unwrap();
    let manifest = run_batch(&parallel, &inputs, Arc::new(NullLogger::new())).unwrap();

    assert_eq!(manifest.files[0].source, "Mail/Welcome.cshtml");
    for relative in ["Mail/Welcome.cshtml.cs", "Views/Home/Index.cshtml.cs"] {
        assert_eq!(
            fs::read_to_string(dir.path().join("seq").join(relative)).unwrap(),
            fs::read_to_string(dir.path().join("par").join(relative)).unwrap()
        );
    }
}

#[test]
fn should_abort_batch_on_template_error() {
    let dir = project();
    write(dir.path(), "Mail/Broken.cshtml", "@{ var x = 1;");
    let inputs = expand_inputs(dir.path(), &["Mail/*.cshtml".to_string()]).unwrap();

    let err = run_batch(&options(&dir), &inputs, Arc::new(NullLogger::new())).unwrap_err();

    assert!(format!("{:#}", err).contains("Mail/Broken.cshtml"));
    assert!(!dir
        .path()
        .join("obj/CodeGen")
        .join(MANIFEST_FILE_NAME)
        .exists());
}

#[test]
fn should_skip_everything_without_inputs() {
    let dir = TempDir::new().unwrap();
    let manifest = run_batch(&options(&dir), &[], Arc::new(NullLogger::new())).unwrap();

    assert!(manifest.files.is_empty());
    assert!(!dir.path().join("obj").exists());
}

#[test]
fn should_apply_project_config() {
    let dir = project();
    write(
        dir.path(),
        "razorgen.json",
        r#"{
            "rootNamespace": "Configured",
            "outputDir": "generated",
            "runtime": "v1",
            "namespaces": { "Mail/Welcome.cshtml": "Mailer" }
        }"#,
    );

    let config = ProjectConfig::load_from_root(dir.path()).unwrap();
    let options = BatchOptions::from_config(dir.path(), &config).unwrap();
    assert_eq!(options.runtime, RuntimeVersion::V1);

    let inputs = vec![dir.path().join("Mail/Welcome.cshtml")];
    let manifest = run_batch(&options, &inputs, Arc::new(NullLogger::new())).unwrap();

    let output = &manifest.files[0].output;
    assert_eq!(output, &dir.path().join("generated/Mail/Welcome.cshtml.cs"));
    let code = fs::read_to_string(output).unwrap();
    assert!(code.contains("namespace Mailer"));
    assert!(code.contains("Runtime Version:4.0.30319.1\n"));
}

#[test]
fn should_reject_unknown_runtime_in_config() {
    let config = ProjectConfig {
        runtime: Some("v3".to_string()),
        ..ProjectConfig::default()
    };
    assert!(BatchOptions::from_config("/tmp", &config).is_err());
}

#[test]
fn should_use_defaults_without_config_file() {
    let dir = TempDir::new().unwrap();
    assert_eq!(
        ProjectConfig::load_from_root(dir.path()).unwrap(),
        ProjectConfig::default()
    );
}
