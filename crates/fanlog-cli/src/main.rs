//! fanlog CLI
//!
//! Thin wrapper around fanlog-core for command-line usage.
//!
//! ## Usage
//!
//! ```bash
//! # List the known log levels
//! fanlog levels
//! fanlog levels --all
//!
//! # Create a session config file with two file sinks
//! fanlog session init session.logcfg --level Warning \
//!     --file-sink errors=errors.log --file-sink audit=audit.xml
//!
//! # Show what a session config file contains
//! fanlog session inspect session.logcfg
//!
//! # Route sample messages through the engine
//! fanlog demo --level Debug --log-file demo.log
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use fanlog_core::{
    assemble_parts, EngineFactory, FileSink, JsonSettings, LogLevel, Logger, LoggerConfig,
    MemorySettings, SettingsStore, FILE_SINK_TAG,
};

/// fanlog - pluggable multi-sink logging engine
#[derive(Parser)]
#[command(name = "fanlog")]
#[command(version)]
#[command(about = "fanlog - pluggable multi-sink logging engine")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Settings file for remembered preferences (default: in-memory)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the known log levels
    Levels {
        /// Include the Debug and Trace levels
        #[arg(short, long)]
        all: bool,
    },

    /// Session config management
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Route sample messages at every level through the engine
    Demo {
        /// Global verbosity threshold
        #[arg(short, long, default_value = "Debug")]
        level: String,

        /// Also attach a file sink writing to this path
        #[arg(short = 'f', long)]
        log_file: Option<PathBuf>,

        /// Formatting engine for the file sink (default: by extension)
        #[arg(long)]
        format: Option<String>,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Parse a session config file and show its contents
    Inspect {
        /// Session config file
        file: PathBuf,
    },

    /// Create a session config file
    Init {
        /// Session config file to write
        file: PathBuf,

        /// Global verbosity threshold to store
        #[arg(short, long, default_value = "Debug")]
        level: String,

        /// File sink to include, as NAME=PATH (repeatable)
        #[arg(long = "file-sink", value_name = "NAME=PATH")]
        file_sinks: Vec<String>,
    },
}

fn setup_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

fn parse_level(name: &str) -> Result<LogLevel> {
    LogLevel::parse(name).with_context(|| {
        format!(
            "unknown log level '{}' (try one of: {})",
            name,
            LogLevel::level_strings(true).join(", ")
        )
    })
}

/// Split a `NAME=PATH` sink spec.
fn parse_sink_spec(spec: &str) -> Result<(&str, &Path)> {
    match spec.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name, Path::new(path)))
        }
        _ => bail!("invalid file sink spec '{}', expected NAME=PATH", spec),
    }
}

fn open_settings(path: Option<&Path>) -> Result<Arc<dyn SettingsStore>> {
    Ok(match path {
        Some(path) => Arc::new(
            JsonSettings::open(path)
                .with_context(|| format!("could not open settings file {}", path.display()))?,
        ),
        None => Arc::new(MemorySettings::new()),
    })
}

fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fanlog").join("settings.json"))
}

fn build_logger(settings: Option<&Path>) -> Result<Logger> {
    let logger = Logger::new(LoggerConfig {
        settings: open_settings(settings)?,
        release_mode: false,
        ..LoggerConfig::default()
    });
    logger.initialize()?;
    Ok(logger)
}

fn inspect_session(file: &Path) -> Result<()> {
    let data = std::fs::read(file)
        .with_context(|| format!("could not read session config {}", file.display()))?;

    let mut factory = EngineFactory::new();
    factory.register_constructor(FILE_SINK_TAG, FileSink::constructor());
    let parsed = fanlog_core::session::parse_session(&data, &factory)
        .with_context(|| format!("invalid session config {}", file.display()))?;

    println!("Session config: {}", file.display());
    println!("  Global level: {}", parsed.threshold);
    println!("  Reconstructible engines: {}", parsed.engines.len());
    println!("  Engine properties:");
    for props in &parsed.properties {
        let formatting = if props.formatting_engine.is_empty() {
            "(none)"
        } else {
            props.formatting_engine.as_str()
        };
        println!(
            "    {} (formatting: {}, active: {})",
            props.name, formatting, props.active
        );
    }
    Ok(())
}

fn init_session(
    settings: Option<&Path>,
    file: &Path,
    level: &str,
    file_sinks: &[String],
) -> Result<()> {
    let threshold = parse_level(level)?;
    let logger = build_logger(settings)?;
    logger.set_global_level(threshold);

    for spec in file_sinks {
        let (name, path) = parse_sink_spec(spec)?;
        logger
            .new_file_engine(name, path, None)
            .with_context(|| format!("could not create file sink '{}'", name))?;
        logger.enable_engine(name)?;
    }

    logger.save_session_config(Some(file))?;
    println!("Session config written to {}", file.display());
    println!("  Global level: {}", threshold);
    println!("  File sinks: {}", file_sinks.len());
    Ok(())
}

fn run_demo(
    settings: Option<&Path>,
    level: &str,
    log_file: Option<&Path>,
    format: Option<&str>,
) -> Result<()> {
    let threshold = parse_level(level)?;
    let logger = build_logger(settings)?;
    logger.set_global_level(threshold);
    logger.toggle_console_engine(true);

    if let Some(path) = log_file {
        logger.new_file_engine("demo", path, format)?;
        logger.enable_engine("demo")?;
    }

    tracing::debug!(target: "fanlog::cli", %threshold, "demo dispatch starting");

    logger.submit("All", LogLevel::Info, vec!["demo started".to_string()]);
    logger.submit(
        "All",
        LogLevel::Warning,
        assemble_parts(
            "something looks off",
            vec![None, Some("will keep going".to_string())],
        ),
    );
    logger.submit("All", LogLevel::Error, vec!["something failed".to_string()]);
    logger.submit(
        "All",
        LogLevel::Fatal,
        vec!["something failed badly".to_string()],
    );
    logger.submit("All", LogLevel::Debug, vec!["debug detail".to_string()]);
    logger.submit("All", LogLevel::Trace, vec!["trace detail".to_string()]);
    logger.submit_priority(
        "All",
        LogLevel::Info,
        vec!["demo finished".to_string()],
    );

    logger.set_remember_session_config(false);
    logger.finalize();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let settings = cli.settings.or_else(|| match &cli.command {
        // The demo persists preferences by default; read-only commands
        // stay settings-free unless asked.
        Commands::Demo { .. } => default_settings_path(),
        _ => None,
    });

    match cli.command {
        Commands::Levels { all } => {
            for name in LogLevel::level_strings(all) {
                println!("{}", name);
            }
        }

        Commands::Session { action } => match action {
            SessionAction::Inspect { file } => inspect_session(&file)?,
            SessionAction::Init {
                file,
                level,
                file_sinks,
            } => init_session(settings.as_deref(), &file, &level, &file_sinks)?,
        },

        Commands::Demo {
            level,
            log_file,
            format,
        } => run_demo(
            settings.as_deref(),
            &level,
            log_file.as_deref(),
            format.as_deref(),
        )?,
    }

    Ok(())
}
