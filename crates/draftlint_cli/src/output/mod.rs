//! Output formatting module

mod json;
mod text;

use draftlint_core::AnalysisReport;
use miette::Result;

/// Prints the report and returns true if it carries any diagnostic.
pub fn output_report(report: &AnalysisReport, format: &str) -> Result<bool> {
    match format {
        "json" => json::output_json(report)?,
        _ => text::output_text(report),
    }

    Ok(report.diagnostic_count() > 0)
}
