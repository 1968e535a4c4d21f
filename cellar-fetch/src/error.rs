//! Error types for fetching.

use thiserror::Error;

/// Errors downloading and verifying a file.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: reqwest::StatusCode },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },
}

impl FetchError {
    /// Whether retrying the same request might succeed: connection resets,
    /// timeouts, and 5xx responses are worth another attempt; 4xx responses
    /// and checksum mismatches are not.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            },
            FetchError::Status { status, .. } => status.is_server_error(),
            FetchError::ClientBuild(_) | FetchError::Io { .. } | FetchError::ChecksumMismatch { .. } => false,
        }
    }
}

/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
