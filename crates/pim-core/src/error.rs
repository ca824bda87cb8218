//! Error types for pim-core

use thiserror::Error;

/// Main error type for pim-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Carries the rejected input; the message is fixed.
    #[error("Invalid date format. Expected: MM/DD/YYYY HH:MM:SS")]
    InvalidDate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for pim-core
pub type Result<T> = std::result::Result<T, Error>;
