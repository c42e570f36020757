//! Command-line interface for readme-gen
//!
//! `readme` generates a README for one repository; `dataset`, `collect` and
//! `upload` build and publish chunked datasets; `info` inspects a checkout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{load_config, CliOverrides};
use crate::domain::Config;

mod collect;
mod dataset;
mod info;
mod progress;
mod readme;
mod upload;
mod utils;

/// Generate READMEs and README datasets from source repositories
#[derive(Parser)]
#[command(name = "readme-gen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (readme-gen.toml or readme-gen.yml)
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a README.md for a local directory or repository URL
    Readme(readme::ReadmeArgs),

    /// Build a chunked dataset from a directory of mirrored repositories
    Dataset(dataset::DatasetArgs),

    /// Build a dataset from GitHub search results
    Collect(collect::CollectArgs),

    /// Upload a folder of chunk files as a Hugging Face dataset
    Upload(upload::UploadArgs),

    /// Show a repository's structure and file classification
    Info(info::InfoArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise INFO, or DEBUG with --verbose
    let default_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter =
        EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Readme(args) => readme::run(args, config_path),
        Commands::Dataset(args) => dataset::run(args, config_path),
        Commands::Collect(args) => collect::run(args, config_path),
        Commands::Upload(args) => upload::run(args),
        Commands::Info(args) => info::run(args, config_path),
    }
}

/// File settings from the working directory (or `--config`), then CLI flags.
fn resolve_config(config_path: Option<&Path>, overrides: CliOverrides) -> Result<Config> {
    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd, config_path)?;
    Ok(overrides.apply(config))
}
