//! updr - upgrade only the direct dependencies of a Python project
//!
//! Reads requirements.txt or pyproject.toml, upgrades the outdated direct
//! dependencies with pip after confirmation, and repins them.
//!
//! Exit codes: 0 on success (including nothing to do or a declined
//! prompt), 1 on errors before anything was upgraded, 2 when packages were
//! upgraded but the manifest could not be updated.

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use updr::cli::CliArgs;
use updr::config::PipConfig;
use updr::error::AppError;
use updr::orchestrator::{Orchestrator, RunOptions};
use updr::package_manager::SystemPip;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            let code = e
                .downcast_ref::<AppError>()
                .map(AppError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

/// Warnings by default, debug with --verbose; UPDR_LOG overrides both
fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("UPDR_LOG")
        .format_timestamp(None)
        .init();
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<()> {
    log::debug!("updr v{}", env!("CARGO_PKG_VERSION"));

    let config = PipConfig::resolve(args.python.as_deref(), std::env::var_os("VIRTUAL_ENV"));
    log::debug!("Using interpreter {}", config.python.display());

    let file = std::path::absolute(&args.file)
        .with_context(|| format!("invalid path {}", args.file.display()))?;

    let options = RunOptions {
        dry_run: args.dry_run,
        show_progress: io::stderr().is_terminal(),
        color: io::stdout().is_terminal(),
    };
    let orchestrator = Orchestrator::new(SystemPip::new(config), options);

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    let outcome = orchestrator.run(&file, &mut input, &mut output)?;
    log::debug!("Run finished: {:?}", outcome);
    Ok(())
}
