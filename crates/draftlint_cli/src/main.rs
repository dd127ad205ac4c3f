//! draftlint CLI
//!
//! Incremental linter for hierarchical LaTeX-style documents.

mod cli;
mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{CacheCommands, Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(has_diagnostics) => {
            if has_diagnostics {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match &cli.command {
        Commands::Check {
            elements,
            file,
            format,
            workspace,
        } => commands::check::run_check(&cli, elements, file.as_deref(), format, workspace),
        Commands::Cache { command } => match command {
            CacheCommands::Status { workspace } => commands::cache::run_status(&cli, workspace),
            CacheCommands::Clean { workspace } => commands::cache::run_clean(&cli, workspace),
        },
    }
}
