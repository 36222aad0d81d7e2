use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by a storage backend.
///
/// The publish stage never retries; [`is_retryable`](Self::is_retryable) is
/// informational for callers that want to re-run a failed file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The bucket or object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend rejected or failed the transfer.
    #[error("transfer failed: {0}")]
    Transfer(String),

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The backend did not respond within its deadline.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// The backend throttled the request.
    #[error("rate limited")]
    RateLimited,

    /// The backend was given invalid configuration or credentials.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Reading the local file or body stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Returns `true` if the error is transient and the operation may succeed
    /// on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(_) | Self::RateLimited
        )
    }
}
