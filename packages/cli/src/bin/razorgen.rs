/**
 * Razor Generator CLI - razorgen
 *
 * Generates C# files for Razor templates in a project
 */
use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use razor_generator_cli::batch::{expand_inputs, DEFAULT_INPUT_PATTERN};
use razor_generator_cli::config::CONFIG_FILE_NAME;
use razor_generator_cli::{run_batch, BatchOptions, ProjectConfig};
use razor_generator_core::logging::{ConsoleLogger, LogLevel, Logger};
use razor_generator_core::version::version_string;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

fn command() -> Command {
    Command::new("razorgen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generates C# classes from Razor templates")
        .arg(
            Arg::new("files")
                .value_name("FILES")
                .num_args(0..)
                .help("Templates or glob patterns, relative to the project root"),
        )
        .arg(
            Arg::new("project-root")
                .short('p')
                .long("project-root")
                .value_name("DIR")
                .help("Project root (defaults to the current directory)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Project config file (defaults to razorgen.json in the project root)"),
        )
        .arg(
            Arg::new("root-namespace")
                .long("root-namespace")
                .value_name("NAMESPACE")
                .help("Namespace prefixed to folder-derived namespaces"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Output directory (defaults to obj/CodeGen)"),
        )
        .arg(
            Arg::new("runtime")
                .short('r')
                .long("runtime")
                .value_name("VERSION")
                .help("Razor runtime version: v1 or v2"),
        )
        .arg(
            Arg::new("load-extensions")
                .long("load-extensions")
                .action(ArgAction::SetTrue)
                .help("Load transformer plugins from the plugin directory"),
        )
        .arg(
            Arg::new("plugin-dir")
                .long("plugin-dir")
                .value_name("DIR")
                .help("Plugin directory (defaults to <project root>/plugins)"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .action(ArgAction::SetTrue)
                .help("Generate templates in parallel"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet")
                .help("Log debug output"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Only log errors"),
        )
}

fn run(matches: &ArgMatches, logger: Arc<dyn Logger>) -> anyhow::Result<()> {
    let project_root = match matches.get_one::<String>("project-root") {
        Some(root) => PathBuf::from(root),
        None => std::env::current_dir()?,
    };

    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| project_root.join(CONFIG_FILE_NAME));
    let config = if config_path.is_file() || matches.contains_id("config") {
        logger.debug(&format!("using {}", config_path.display()));
        ProjectConfig::load(&config_path)
            .with_context(|| format!("failed to load '{}'", config_path.display()))?
    } else {
        ProjectConfig::default()
    };

    let mut options = BatchOptions::from_config(&project_root, &config)?;
    if let Some(namespace) = matches.get_one::<String>("root-namespace") {
        options.root_namespace = Some(namespace.clone());
    }
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        options.output_dir = PathBuf::from(dir);
    }
    if let Some(runtime) = matches.get_one::<String>("runtime") {
        options.runtime = runtime.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(dir) = matches.get_one::<String>("plugin-dir") {
        options.plugin_directory = Some(PathBuf::from(dir));
    }
    options.load_extensions |= matches.get_flag("load-extensions");
    options.parallel |= matches.get_flag("parallel");

    let mut patterns: Vec<String> = matches
        .get_many::<String>("files")
        .map(|files| files.cloned().collect())
        .unwrap_or_default();
    if patterns.is_empty() {
        patterns = config.files.clone();
    }
    if patterns.is_empty() {
        patterns.push(DEFAULT_INPUT_PATTERN.to_string());
    }

    let inputs = expand_inputs(&project_root, &patterns)?;
    logger.debug(&format!("{}: {} template(s)", version_string(), inputs.len()));

    let manifest = run_batch(&options, &inputs, logger)?;
    for file in &manifest.files {
        println!("{}", file.output.display());
    }
    Ok(())
}

fn main() {
    let matches = command().get_matches();

    let level = if matches.get_flag("verbose") {
        LogLevel::Debug
    } else if matches.get_flag("quiet") {
        LogLevel::Error
    } else {
        LogLevel::Info
    };
    let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::with_tag(level, "razorgen"));

    if let Err(err) = run(&matches, Arc::clone(&logger)) {
        logger.error(&format!("{:#}", err));
        process::exit(1);
    }
}
