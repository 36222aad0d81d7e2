use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::file::FileRecord;
use crate::key::{DestinationKey, normalize_destination};

/// Caller-supplied rewrite of a computed destination key.
pub type DestinationTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Object metadata options applied to every upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataOptions {
    /// `Cache-Control` header stored on each object.
    #[serde(default, alias = "cacheControl")]
    pub cache_control: Option<String>,
}

/// Publish options as written in a configuration file.
///
/// # Example
///
/// ```toml
/// bucket = "static-assets"
/// key_filename = "/etc/gcp/publisher.json"
/// project_id = "my-project"
/// base = "assets/"
/// public = true
///
/// [metadata]
/// cache_control = "public, max-age=3600"
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOptions {
    /// Target bucket name. Required.
    #[serde(default)]
    pub bucket: Option<String>,

    /// Path to a service account JSON key file.
    /// If not set, Application Default Credentials are used.
    #[serde(default, alias = "keyFilename")]
    pub key_filename: Option<String>,

    /// GCP project ID.
    #[serde(default, alias = "projectId")]
    pub project_id: Option<String>,

    /// Key prefix inside the bucket.
    #[serde(default)]
    pub base: String,

    /// Make every uploaded object publicly readable.
    #[serde(default)]
    pub public: bool,

    /// Object metadata applied to every upload.
    #[serde(default)]
    pub metadata: MetadataOptions,

    /// Gzip the body in transit and store it with `Content-Encoding: gzip`.
    #[serde(default)]
    pub gzip: bool,

    /// Use resumable uploads.
    #[serde(default)]
    pub resumable: bool,
}

impl fmt::Debug for PublishOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishOptions")
            .field("bucket", &self.bucket)
            .field("key_filename", &self.key_filename.as_ref().map(|_| "[REDACTED]"))
            .field("project_id", &self.project_id)
            .field("base", &self.base)
            .field("public", &self.public)
            .field("metadata", &self.metadata)
            .field("gzip", &self.gzip)
            .field("resumable", &self.resumable)
            .finish()
    }
}

impl PublishOptions {
    /// Create options targeting the given bucket.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: Some(bucket.into()),
            ..Self::default()
        }
    }

    /// Parse options from a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse options from a JSON document.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load options from a file. `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }
}

/// Validated, immutable publish configuration.
#[derive(Clone)]
pub struct PublishConfig {
    bucket_name: String,
    credentials_path: Option<String>,
    project_id: Option<String>,
    base_path: String,
    make_public: bool,
    cache_control: Option<String>,
    gzip: bool,
    resumable: bool,
    destination_transform: Option<DestinationTransform>,
}

impl fmt::Debug for PublishConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishConfig")
            .field("bucket_name", &self.bucket_name)
            .field(
                "credentials_path",
                &self.credentials_path.as_ref().map(|_| "[REDACTED]"),
            )
            .field("project_id", &self.project_id)
            .field("base_path", &self.base_path)
            .field("make_public", &self.make_public)
            .field("cache_control", &self.cache_control)
            .field("gzip", &self.gzip)
            .field("resumable", &self.resumable)
            .field(
                "destination_transform",
                &self.destination_transform.as_ref().map(|_| ".."),
            )
            .finish()
    }
}

impl TryFrom<PublishOptions> for PublishConfig {
    type Error = ConfigError;

    fn try_from(options: PublishOptions) -> Result<Self, Self::Error> {
        let bucket_name = options
            .bucket
            .filter(|b| !b.trim().is_empty())
            .ok_or(ConfigError::MissingBucket)?;

        Ok(Self {
            bucket_name,
            credentials_path: options.key_filename,
            project_id: options.project_id,
            base_path: options.base,
            make_public: options.public,
            cache_control: options.metadata.cache_control,
            gzip: options.gzip,
            resumable: options.resumable,
            destination_transform: None,
        })
    }
}

impl PublishConfig {
    /// Start building a configuration for the given bucket.
    pub fn builder(bucket: impl Into<String>) -> PublishConfigBuilder {
        PublishConfigBuilder {
            options: PublishOptions::new(bucket),
            destination_transform: None,
        }
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn credentials_path(&self) -> Option<&str> {
        self.credentials_path.as_deref()
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn make_public(&self) -> bool {
        self.make_public
    }

    pub fn cache_control(&self) -> Option<&str> {
        self.cache_control.as_deref()
    }

    pub fn gzip(&self) -> bool {
        self.gzip
    }

    pub fn resumable(&self) -> bool {
        self.resumable
    }

    /// Attach a destination transform to an already validated configuration.
    #[must_use]
    pub fn with_destination_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.destination_transform = Some(Arc::new(transform));
        self
    }

    /// The key a file is stored under: the normalized destination, or the
    /// destination transform's output, unmodified, when one is configured.
    pub fn destination_for(&self, file: &FileRecord) -> DestinationKey {
        let key = normalize_destination(&self.base_path, file);
        match &self.destination_transform {
            Some(transform) => DestinationKey::from_raw(transform(key.as_str())),
            None => key,
        }
    }
}

/// Builder for [`PublishConfig`]; `build` applies the same validation as
/// [`PublishConfig::try_from`].
pub struct PublishConfigBuilder {
    options: PublishOptions,
    destination_transform: Option<DestinationTransform>,
}

impl PublishConfigBuilder {
    #[must_use]
    pub fn with_credentials_path(mut self, path: impl Into<String>) -> Self {
        self.options.key_filename = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.options.project_id = Some(project_id.into());
        self
    }

    #[must_use]
    pub fn with_base_path(mut self, base: impl Into<String>) -> Self {
        self.options.base = base.into();
        self
    }

    #[must_use]
    pub fn with_public(mut self, public: bool) -> Self {
        self.options.public = public;
        self
    }

    #[must_use]
    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.options.metadata.cache_control = Some(cache_control.into());
        self
    }

    #[must_use]
    pub fn with_gzip(mut self, gzip: bool) -> Self {
        self.options.gzip = gzip;
        self
    }

    #[must_use]
    pub fn with_resumable(mut self, resumable: bool) -> Self {
        self.options.resumable = resumable;
        self
    }

    #[must_use]
    pub fn with_destination_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.destination_transform = Some(Arc::new(transform));
        self
    }

    pub fn build(self) -> Result<PublishConfig, ConfigError> {
        let mut config = PublishConfig::try_from(self.options)?;
        config.destination_transform = self.destination_transform;
        Ok(config)
    }
}
