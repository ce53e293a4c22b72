//! Error types for the headless runner.

use idle_core::error::EconomyError;
use thiserror::Error;

/// Errors from loading files or driving a run.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// A path given on the command line does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Failed to read or write a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a RON document.
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// File that failed to parse.
        path: String,
        /// Parser message.
        message: String,
    },

    /// Failed to encode a report.
    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),

    /// The economy rejected the content or configuration.
    #[error(transparent)]
    Economy(#[from] EconomyError),

    /// A strategy names content the catalog does not have.
    #[error("Invalid strategy: {0}")]
    InvalidStrategy(String),
}

/// Result type for headless operations.
pub type Result<T> = std::result::Result<T, HeadlessError>;
