//! Error types.

use thiserror::Error;

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum LinterError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed element input.
    #[error("Input error: {0}")]
    Input(String),

    /// Rule error.
    #[error("Rule error: {0}")]
    Rule(#[from] draftlint_rules::RuleError),

    /// Cache error.
    #[error("Cache error: {0}")]
    Cache(#[from] draftlint_cache::CacheError),
}

impl LinterError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an input error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }
}

/// Errors a reviewer reports for a single element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    /// The provider cannot continue; the rest of the queue is abandoned.
    #[error("Reviewer failed: {0}")]
    Fatal(String),

    /// This element could not be reviewed; it stays uncovered and is
    /// retried on the next run.
    #[error("Review skipped: {0}")]
    Skipped(String),
}

impl ReviewError {
    /// Creates a fatal error.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }

    /// Creates a skip.
    pub fn skipped(message: impl Into<String>) -> Self {
        Self::Skipped(message.into())
    }
}

/// Errors returned by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// An explicit request arrived while an analysis was running.
    #[error("An analysis is already running")]
    Busy,
}
