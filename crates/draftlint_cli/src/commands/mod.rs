//! Subcommand implementations

pub mod cache;
pub mod check;

use std::path::Path;

use draftlint_core::LinterConfig;
use miette::{IntoDiagnostic, Result};
use tracing::info;

use crate::cli::Cli;

/// Loads the config named on the command line, or the workspace's own.
pub fn load_config(cli: &Cli, workspace: &Path) -> Result<LinterConfig> {
    if let Some(path) = &cli.config {
        info!("Using config: {}", path.display());
        return LinterConfig::from_file(path).into_diagnostic();
    }

    LinterConfig::discover(workspace).into_diagnostic()
}
