//! Text output formatter

use std::collections::BTreeMap;

use draftlint_core::{AnalysisReport, DiagnosticRecord};

pub fn output_text(report: &AnalysisReport) {
    let mut by_file: BTreeMap<&str, Vec<&DiagnosticRecord>> = BTreeMap::new();
    for diag in report.diagnostics() {
        by_file.entry(diag.file_path.as_str()).or_default().push(diag);
    }

    for (path, diagnostics) in by_file {
        println!("\n{}:", path);
        for diag in diagnostics {
            // Editors count from one.
            println!(
                "  {}:{} {} [{}]: {}",
                diag.range.start.line + 1,
                diag.range.start.column + 1,
                diag.severity,
                diag.code,
                diag.message
            );
        }
    }

    println!();
    println!(
        "{} diagnostics ({} rechecked, {} replayed)",
        report.diagnostic_count(),
        report.rechecked(),
        report.replayed()
    );
}
