use gcs_publish_core::PublishConfig;
use serde::{Deserialize, Serialize};

/// Connection settings for the Google Cloud Storage backend.
///
/// Credentials are optional: without a key file, Application Default
/// Credentials are used, or anonymous credentials when an endpoint override
/// points at an emulator.
#[derive(Clone, Serialize, Deserialize)]
pub struct GcsConfig {
    /// Bucket every object is written to.
    pub bucket: String,

    /// GCP project ID.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Path to a service account JSON key file.
    #[serde(default)]
    pub credentials_path: Option<String>,

    /// Optional endpoint URL override for local development
    /// (e.g. `fake-gcs-server`).
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl std::fmt::Debug for GcsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsConfig")
            .field("bucket", &self.bucket)
            .field("project_id", &self.project_id)
            .field(
                "credentials_path",
                &self.credentials_path.as_ref().map(|_| "[REDACTED]"),
            )
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl GcsConfig {
    /// Create a new `GcsConfig` for the given bucket.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            project_id: None,
            credentials_path: None,
            endpoint_url: None,
        }
    }

    /// Set the GCP project ID.
    #[must_use]
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set the path to a service account JSON key file.
    #[must_use]
    pub fn with_credentials_path(mut self, path: impl Into<String>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Set the endpoint URL override for local development.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }
}

impl From<&PublishConfig> for GcsConfig {
    fn from(config: &PublishConfig) -> Self {
        Self {
            bucket: config.bucket_name().to_owned(),
            project_id: config.project_id().map(str::to_owned),
            credentials_path: config.credentials_path().map(str::to_owned),
            endpoint_url: None,
        }
    }
}
