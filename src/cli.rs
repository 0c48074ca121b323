//! CLI argument parsing module for updr

use clap::Parser;
use std::path::PathBuf;

/// Upgrade only direct dependencies from requirements.txt or pyproject.toml
#[derive(Parser, Debug, Clone)]
#[command(
    name = "updr",
    version,
    about = "Upgrade only direct dependencies from requirements.txt or pyproject.toml"
)]
pub struct CliArgs {
    /// Path to requirements.txt or pyproject.toml
    pub file: PathBuf,

    /// Python interpreter whose environment is upgraded
    /// (default: $VIRTUAL_ENV's python, then python3)
    #[arg(long, value_name = "PATH")]
    pub python: Option<PathBuf>,

    /// Dry run mode - show outdated direct dependencies without upgrading
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose (debug) logging
    #[arg(long)]
    pub verbose: bool,
}
