//! Error types for calls against the fleet API.

use thiserror::Error;

/// Errors that can occur while talking to the fleet API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// The API answered with an error status. `detail` is the server's own
    /// wording and is shown to the operator unchanged.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    /// Response doesn't match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Classify a reqwest error.
    pub(crate) fn from_transport(e: reqwest::Error, timeout_ms: u64) -> Self {
        if e.is_timeout() {
            ApiError::Timeout(timeout_ms)
        } else if e.is_decode() {
            ApiError::InvalidResponse(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }

    /// HTTP status for remote rejections.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
