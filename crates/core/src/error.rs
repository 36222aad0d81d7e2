use thiserror::Error;

/// Errors raised while loading or validating publish configuration.
///
/// These are fatal: they surface when the publish stage is constructed,
/// before any file is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The `bucket` option is missing or blank.
    #[error("missing required configuration: bucket")]
    MissingBucket,

    /// The configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(String),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            ConfigError::MissingBucket.to_string(),
            "missing required configuration: bucket"
        );
        assert_eq!(
            ConfigError::Parse("expected a table".into()).to_string(),
            "invalid configuration: expected a table"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ConfigError = io.into();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
