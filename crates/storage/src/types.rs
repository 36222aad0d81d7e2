use gcs_publish_core::{DestinationKey, UploadMetadata};
use serde::{Deserialize, Serialize};

/// Everything a backend needs to open a write for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRequest {
    /// Object key inside the bucket.
    pub key: DestinationKey,
    /// Content type, encoding and cache control to store with the object.
    pub metadata: UploadMetadata,
    /// Compress the body with gzip in transit.
    #[serde(default)]
    pub gzip: bool,
    /// Use the backend's resumable transfer mode.
    #[serde(default)]
    pub resumable: bool,
}

impl WriteRequest {
    /// Create a request with transport options disabled.
    pub fn new(key: DestinationKey, metadata: UploadMetadata) -> Self {
        Self {
            key,
            metadata,
            gzip: false,
            resumable: false,
        }
    }

    #[must_use]
    pub fn with_gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    #[must_use]
    pub fn with_resumable(mut self, resumable: bool) -> Self {
        self.resumable = resumable;
        self
    }
}

/// What a backend reports back after a completed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Bucket the object was written to.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// Stored size in bytes.
    pub size: u64,
    /// Content encoding as stored, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
}
