//! `cache` subcommands

use std::path::Path;

use draftlint_core::{DiagnosticFamily, FsBackend, SnapshotStore};
use miette::{IntoDiagnostic, Result};

use super::load_config;
use crate::cli::Cli;

pub fn run_status(cli: &Cli, workspace: &Path) -> Result<bool> {
    let dir = load_config(cli, workspace)?.cache_path(workspace);
    if !dir.exists() {
        println!("No cache at {}", dir.display());
        return Ok(false);
    }

    let store = SnapshotStore::new(FsBackend::new(&dir));
    println!("Cache directory: {}", dir.display());

    match store.load_elements() {
        Some(snapshot) => println!(
            "  elements: {} recorded (generated at {})",
            snapshot.len(),
            snapshot.generated_at
        ),
        None => println!("  elements: absent"),
    }

    for family in DiagnosticFamily::ALL {
        match store.load_diagnostics(family) {
            Some(snapshot) => println!(
                "  {}: {} diagnostics over {} elements",
                family,
                snapshot.diagnostics.len(),
                snapshot.baseline_keys.len()
            ),
            None => println!("  {}: absent", family),
        }
    }

    Ok(false)
}

pub fn run_clean(cli: &Cli, workspace: &Path) -> Result<bool> {
    let dir = load_config(cli, workspace)?.cache_path(workspace);
    SnapshotStore::new(FsBackend::new(&dir))
        .clear()
        .into_diagnostic()?;
    println!("Removed {}", dir.display());
    Ok(false)
}
