//! Error types for girder-jsonl operations.

use std::io;
use thiserror::Error;

/// The error type for girder-jsonl operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading or writing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON error with the line it occurred on, for strict reads.
    #[error("line {line_number}: {error}")]
    JsonAtLine {
        /// The 1-based line number of the offending record.
        line_number: usize,
        /// The underlying JSON parse error.
        error: serde_json::Error,
    },
}

/// A specialized Result type for girder-jsonl operations.
pub type Result<T> = std::result::Result<T, Error>;
