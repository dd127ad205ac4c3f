//! `check` subcommand

use std::fs;
use std::path::Path;

use draftlint_core::{
    AnalyzeOptions, Analyzer, Element, FsBackend, MemoryBackend, SnapshotBackend, SnapshotStore,
};
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::{debug, info};

use super::load_config;
use crate::cli::Cli;
use crate::output::output_report;

pub fn run_check(
    cli: &Cli,
    elements_path: &Path,
    file: Option<&str>,
    format: &str,
    workspace: &Path,
) -> Result<bool> {
    let config = load_config(cli, workspace)?;

    let content = fs::read_to_string(elements_path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", elements_path.display()))?;
    let elements: Vec<Element> = serde_json::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Invalid element array in {}", elements_path.display()))?;
    debug!("Loaded {} elements", elements.len());

    let backend: Box<dyn SnapshotBackend> = if cli.no_cache || !config.cache {
        info!("Cache disabled, analyzing from scratch");
        Box::new(MemoryBackend::new())
    } else {
        Box::new(FsBackend::new(config.cache_path(workspace)))
    };
    let analyzer = Analyzer::new(config, SnapshotStore::new(backend));

    let options = AnalyzeOptions::default();
    let report = match file {
        Some(path) => analyzer.analyze_file(path, elements, &options),
        None => analyzer.analyze(elements, &options),
    }
    .into_diagnostic()?;

    output_report(&report, format)
}
