use gcs_publish_core::ConfigError;
use gcs_publish_storage::StorageError;
use thiserror::Error;

/// Errors produced by the publish stage.
///
/// `Configuration` and `Backend` are raised while constructing a
/// [`Publisher`](crate::Publisher); the other variants fail a single file
/// and leave the rest of the pipeline running.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The publish options were invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The storage backend could not be initialized.
    #[error("failed to initialize storage backend: {0}")]
    Backend(#[source] StorageError),

    /// The upload of a file failed.
    #[error("upload of {key} failed: {source}")]
    Transport {
        key: String,
        #[source]
        source: StorageError,
    },

    /// The object was uploaded but could not be made public.
    #[error("making {key} public failed: {source}")]
    VisibilityChange {
        key: String,
        #[source]
        source: StorageError,
    },
}

impl PublishError {
    /// The destination key of the file that failed, for per-file errors.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Transport { key, .. } | Self::VisibilityChange { key, .. } => Some(key),
            Self::Configuration(_) | Self::Backend(_) => None,
        }
    }

    /// Returns `true` if re-running the file may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { source, .. } | Self::VisibilityChange { source, .. } => {
                source.is_retryable()
            }
            Self::Configuration(_) | Self::Backend(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_is_transparent() {
        let err = PublishError::from(ConfigError::MissingBucket);
        assert_eq!(err.to_string(), "missing required configuration: bucket");
        assert!(err.key().is_none());
        assert!(!err.is_retryable());
    }

    #[test]
    fn transport_error_names_key() {
        let err = PublishError::Transport {
            key: "assets/app.js".into(),
            source: StorageError::Connection("reset by peer".into()),
        };
        assert_eq!(
            err.to_string(),
            "upload of assets/app.js failed: connection error: reset by peer"
        );
        assert_eq!(err.key(), Some("assets/app.js"));
        assert!(err.is_retryable());
    }

    #[test]
    fn visibility_error_names_key() {
        let err = PublishError::VisibilityChange {
            key: "a.css".into(),
            source: StorageError::Transfer("403 forbidden".into()),
        };
        assert!(err.to_string().starts_with("making a.css public failed"));
        assert!(!err.is_retryable());
    }
}
