//! Error types for vintent-client

use thiserror::Error;

/// Result type alias using vintent-client Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the NLU service
#[derive(Error, Debug)]
pub enum Error {
    /// Network or transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON we expected
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with a non-2xx status
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// A single attempt ran past its deadline
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Build a status error from a response status code
    pub fn status(status: reqwest::StatusCode) -> Self {
        Self::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    /// Check if this error is worth another attempt.
    ///
    /// Every transport-level failure counts; only a bad configuration is final.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Error::InvalidConfig(_))
    }

    /// HTTP status code, if the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
