//! Inspect resolved provisioning configuration.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gce_config::config::{Attribute, ConfigLoader, ProvisionConfig};
use gce_config::logging::{init_logging, LoggingConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gce-config", version, about = "Inspect layered GCE provisioning configuration")]
struct Cli {
    /// Workspace root whose config/ directory is loaded (default: current directory)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Load a single config file instead of the global and workspace sources
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the effective configuration for a zone as JSON
    Resolve {
        /// Zone to resolve (default: the configured zone)
        #[arg(long)]
        zone: Option<String>,
    },
    /// List zones with registered overrides
    Zones,
    /// Check the effective configuration for a zone
    Validate {
        #[arg(long)]
        zone: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: cli.log_level.clone(),
        ..LoggingConfig::default()
    };
    init_logging(Some(&logging))?;

    let mut config = load(&cli)?;
    config.finalize();

    match cli.command {
        Command::Resolve { zone } => {
            let resolved = resolve(&config, zone)?;
            println!("{}", serde_json::to_string_pretty(&resolved.instance_spec()?)?);
        }
        Command::Zones => {
            for zone in config.zone_names() {
                println!("{}", zone);
            }
        }
        Command::Validate { zone } => {
            let resolved = resolve(&config, zone)?;
            if let Err(errors) = resolved.validate() {
                for error in &errors {
                    eprintln!("{}", error);
                }
                bail!("configuration has {} problem(s)", errors.len());
            }
            println!("ok");
        }
    }

    Ok(())
}

fn load(cli: &Cli) -> Result<ProvisionConfig> {
    if let Some(file) = &cli.file {
        return ConfigLoader::load_from_file(file)
            .with_context(|| format!("loading {}", file.display()));
    }
    let workspace = match &cli.workspace {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("resolving current directory")?,
    };
    ConfigLoader::load(&workspace)
        .with_context(|| format!("loading configuration for {}", workspace.display()))
}

fn resolve(config: &ProvisionConfig, zone: Option<String>) -> Result<ProvisionConfig> {
    let zone = match zone {
        Some(zone) => zone,
        None => config
            .get(Attribute::Zone)?
            .context("no zone configured; pass --zone")?
            .to_string(),
    };
    Ok(config.resolve_zone(&zone)?)
}
