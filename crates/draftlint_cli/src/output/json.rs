//! JSON output formatter

use draftlint_core::AnalysisReport;
use miette::{IntoDiagnostic, Result};

pub fn output_json(report: &AnalysisReport) -> Result<()> {
    let output = serde_json::json!({
        "diagnostics": report.diagnostics().collect::<Vec<_>>(),
        "elements": report.elements,
        "rechecked": report.rechecked(),
        "replayed": report.replayed(),
        "complete": report.is_complete(),
        "persistFailures": report.persist_failures,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).into_diagnostic()?
    );
    Ok(())
}
