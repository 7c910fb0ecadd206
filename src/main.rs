//! confload: load, validate and watch configuration files.
//!
//! ```text
//! confload load app.yaml --schema schema.json --validate --output
//! confload watch app.toml
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;

use confload::config::{load_config, ConfigWatcher, ParsedConfig};
use confload::lifecycle::signals;
use confload::observability::logging::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "confload")]
#[command(about = "Configuration file parser for .env, .ini, YAML, JSON, TOML and XML", long_about = None)]
struct Cli {
    /// Default log level when RUST_LOG is not set.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a configuration file once
    Load {
        /// Path to the configuration file
        file: PathBuf,

        /// Path to a JSON schema used for validation (YAML and JSON files)
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Report that the configuration is valid
        #[arg(long)]
        validate: bool,

        /// Print the parsed configuration
        #[arg(long)]
        output: bool,
    },
    /// Keep a configuration file loaded and print it whenever it changes
    Watch {
        /// Path to the configuration file
        file: PathBuf,

        /// Path to a JSON schema used for validation (YAML and JSON files)
        #[arg(long)]
        schema: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_logging(&cli.log_level, format)?;

    let result = match cli.command {
        Commands::Load {
            file,
            schema,
            validate,
            output,
        } => run_load(&file, schema.as_deref(), validate, output),
        Commands::Watch { file, schema } => run_watch(&file, schema.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn read_schema(path: Option<&Path>) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let Some(path) = path else { return Ok(None) };
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read schema {}: {}", path.display(), e))?;
    let schema = serde_json::from_str(&content)
        .map_err(|e| format!("invalid schema {}: {}", path.display(), e))?;
    Ok(Some(schema))
}

fn print_config(config: &ParsedConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn run_load(
    file: &Path,
    schema: Option<&Path>,
    validate: bool,
    output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema = read_schema(schema)?;
    let config = load_config(file, schema.as_ref())?;

    if validate {
        println!("Configuration is valid.");
    }
    if output {
        print_config(&config)?;
    }
    Ok(())
}

async fn run_watch(file: &Path, schema: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let schema = read_schema(schema)?;
    let mut watcher = ConfigWatcher::for_path(file, schema)?;
    watcher.start()?;

    let handle = watcher.handle();
    let mut last = handle.load_full();
    print_config(&last)?;

    let mut reloads = signals::reload_requests();
    let shutdown = signals::shutdown_signal();
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(()) = reloads.recv() => {
                // Failures are logged by the watcher; the old config stays.
                let _ = watcher.reload();
            }
            _ = ticker.tick() => {}
        }

        let current = handle.load_full();
        if !Arc::ptr_eq(&current, &last) {
            print_config(&current)?;
            last = current;
        }
    }

    watcher.stop();
    Ok(())
}
