//! Argument parsing and the top-level run

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use super::setup::ProgramSetup;
use crate::config::RootConfig;

#[derive(Debug, Parser)]
#[command(name = "auto-backup")]
#[command(author, version, about = "Execute backup tasks")]
pub struct Cli {
    /// Path to the TOML configuration file
    pub config: PathBuf,

    /// Only run tasks carrying this tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    run_with(Cli::parse())
}

/// Runs with already parsed arguments
///
/// Failed tasks do not make this return an error; they are reported through
/// notifications only.
pub fn run_with(cli: Cli) -> Result<()> {
    info!(config = %cli.config.display(), tags = ?cli.tags, "auto-backup starting");

    let config = RootConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    let setup = ProgramSetup::new(config)?;

    let summary = setup.run(&cli.tags)?;
    if !summary.succeeded() {
        info!(failed = summary.failed, "Some tasks failed");
    }

    Ok(())
}
