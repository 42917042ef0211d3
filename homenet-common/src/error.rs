//! Common error types for homenet

use thiserror::Error;

/// Common result type for homenet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading process-wide settings
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed or serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
