//! Cache error types.

use thiserror::Error;

/// Errors that can occur in the cache system.
///
/// Only writes surface these to callers. Reads fail soft: a snapshot that
/// cannot be read or parsed is reported as absent instead.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to write a snapshot file.
    #[error("Failed to write snapshot '{name}': {message}")]
    WriteError {
        /// Snapshot file name.
        name: String,
        /// Underlying failure.
        message: String,
    },

    /// Snapshot content could not be decoded.
    #[error("Corrupted snapshot: {0}")]
    Corrupted(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Creates a write error.
    pub fn write(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WriteError {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a corrupted snapshot error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted(message.into())
    }
}
