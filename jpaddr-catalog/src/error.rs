//! Catalog fetch errors

use thiserror::Error;

/// Failure to obtain one catalog document
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog document not found: {0}")]
    NotFound(String),

    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog source: {0}")]
    InvalidSource(String),
}

impl FetchError {
    /// Worth retrying: connection problems, server errors and throttling
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network(_) => true,
            FetchError::Http(status, _) => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<FetchError> for jpaddr_common::Error {
    fn from(err: FetchError) -> Self {
        jpaddr_common::Error::Catalog(err.to_string())
    }
}
