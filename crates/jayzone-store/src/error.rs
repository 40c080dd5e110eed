//! Error types for jayzone-store.

use std::path::PathBuf;

/// Result type for jayzone-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in jayzone-store.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A CSV row could not be turned into a sample.
    #[error("Invalid sample on line {line}: {reason}")]
    InvalidSample { line: u64, reason: String },

    /// CSV reader error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_sample(line: u64, reason: impl Into<String>) -> Self {
        Self::InvalidSample {
            line,
            reason: reason.into(),
        }
    }
}
