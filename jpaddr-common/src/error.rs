//! Common error types for jpaddr

use thiserror::Error;

/// Common result type for jpaddr operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across jpaddr crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error (catalog tables, fixtures)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller input (e.g. a resolution level outside 1..=3)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reference catalog could not be read
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
