//! # draftlint_core
//!
//! Incremental analysis engine for draftlint.
//!
//! This crate provides:
//! - Configuration loading and validation
//! - The [`Analyzer`] pipeline: identify, classify, plan, check, merge
//! - The [`Reviewer`] seam for model-backed review
//! - Single-flight, debounced scheduling of runs
//!
//! ## Example
//!
//! ```rust,ignore
//! use draftlint_core::{AnalyzeOptions, Analyzer, LinterConfig};
//!
//! let config = LinterConfig::discover(".")?;
//! let analyzer = Analyzer::for_workspace(config, ".");
//!
//! let report = analyzer.analyze(elements, &AnalyzeOptions::default())?;
//! for diagnostic in report.diagnostics() {
//!     println!("{}: {}", diagnostic.file_path, diagnostic.message);
//! }
//! ```

mod analyzer;
mod cancel;
mod config;
mod error;
mod report;
mod review;
pub mod scheduler;

pub use analyzer::{AnalyzeOptions, Analyzer, ReviewProgress};
pub use cancel::CancelFlag;
pub use config::{CONFIG_FILE_NAME, DEFAULT_DEBOUNCE_MS, LinterConfig, ReviewerConfig};
pub use error::{LinterError, ReviewError, SchedulerError};
pub use report::{AnalysisReport, LogicReport, ReviewReport, RulePlan};
pub use review::{ReviewOutcome, Reviewer};
pub use scheduler::{AnalysisScheduler, RequestOutcome, Trigger};

pub use draftlint_ast::{Element, ElementKind, Position, Range};
pub use draftlint_cache::{
    DiagnosticFamily, DiagnosticRecord, FsBackend, MemoryBackend, Severity, SnapshotBackend,
    SnapshotStore,
};
