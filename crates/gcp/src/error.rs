use std::time::Duration;

use gcs_publish_storage::StorageError;
use thiserror::Error;

/// Errors specific to Google Cloud Storage operations.
#[derive(Debug, Error)]
pub enum GcpError {
    /// The GCS service returned an error.
    #[error("GCS service error: {0}")]
    ServiceError(String),

    /// The bucket or object does not exist.
    #[error("GCS object not found: {0}")]
    NotFound(String),

    /// The request was throttled by GCS.
    #[error("GCS request throttled")]
    Throttled,

    /// A network or connection error occurred communicating with GCS.
    #[error("GCS connection error: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("GCS request timed out")]
    Timeout,

    /// GCP credential resolution failed.
    #[error("credential error: {0}")]
    CredentialError(String),

    /// Configuration is invalid.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl From<GcpError> for StorageError {
    fn from(err: GcpError) -> Self {
        match err {
            GcpError::ServiceError(msg) => StorageError::Transfer(msg),
            GcpError::NotFound(msg) => StorageError::NotFound(msg),
            GcpError::Throttled => StorageError::RateLimited,
            GcpError::Connection(msg) => StorageError::Connection(msg),
            GcpError::Timeout => StorageError::Timeout(Duration::from_secs(30)),
            GcpError::CredentialError(msg) | GcpError::Configuration(msg) => {
                StorageError::Configuration(msg)
            }
        }
    }
}

/// Classify a GCS error string into the appropriate [`GcpError`].
///
/// Inspects the error message for common patterns (throttling, timeout,
/// connection, missing objects) and maps them to the correct variant.
pub fn classify_gcp_error(error_str: &str) -> GcpError {
    let lower = error_str.to_lowercase();
    if lower.contains("429")
        || lower.contains("throttl")
        || lower.contains("rate exceed")
        || lower.contains("too many")
        || lower.contains("resource_exhausted")
    {
        GcpError::Throttled
    } else if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("deadline_exceeded")
    {
        GcpError::Timeout
    } else if lower.contains("connection")
        || lower.contains("connect")
        || lower.contains("dns")
        || lower.contains("network")
        || lower.contains("unavailable")
    {
        GcpError::Connection(error_str.to_owned())
    } else if lower.contains("not_found") || lower.contains("404") {
        GcpError::NotFound(error_str.to_owned())
    } else {
        GcpError::ServiceError(error_str.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttled_maps_to_rate_limited() {
        let err: StorageError = GcpError::Throttled.into();
        assert!(matches!(err, StorageError::RateLimited));
        assert!(err.is_retryable());
    }

    #[test]
    fn timeout_maps_to_timeout() {
        let err: StorageError = GcpError::Timeout.into();
        assert!(matches!(err, StorageError::Timeout(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn service_error_maps_to_transfer() {
        let err: StorageError = GcpError::ServiceError("forbidden".into()).into();
        assert!(matches!(err, StorageError::Transfer(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn credential_error_maps_to_configuration() {
        let err: StorageError = GcpError::CredentialError("no credentials".into()).into();
        assert!(matches!(err, StorageError::Configuration(_)));
    }

    #[test]
    fn classify_throttled_429() {
        let err = classify_gcp_error("HTTP 429: Too Many Requests");
        assert!(matches!(err, GcpError::Throttled));
    }

    #[test]
    fn classify_deadline_exceeded() {
        let err = classify_gcp_error("DEADLINE_EXCEEDED: operation took too long");
        assert!(matches!(err, GcpError::Timeout));
    }

    #[test]
    fn classify_unavailable() {
        let err = classify_gcp_error("UNAVAILABLE: service is not reachable");
        assert!(matches!(err, GcpError::Connection(_)));
    }

    #[test]
    fn classify_not_found() {
        let err = classify_gcp_error("NOT_FOUND: The specified bucket does not exist");
        assert!(matches!(err, GcpError::NotFound(_)));
    }

    #[test]
    fn classify_generic_service_error() {
        let err = classify_gcp_error("PERMISSION_DENIED: caller lacks storage.objects.create");
        assert!(matches!(err, GcpError::ServiceError(_)));
    }

    #[test]
    fn error_display() {
        assert_eq!(GcpError::Throttled.to_string(), "GCS request throttled");
        assert_eq!(
            GcpError::ServiceError("bad".into()).to_string(),
            "GCS service error: bad"
        );
    }
}
