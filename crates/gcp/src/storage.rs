use std::io::Write;
use std::path::Path;

use bytes::{Bytes, BytesMut};
use flate2::Compression;
use flate2::write::GzEncoder;
use futures::{StreamExt, TryStreamExt};
use gcs_publish_core::{ByteStream, GZIP_ENCODING, UploadMetadata};
use gcs_publish_storage::{ObjectInfo, ObjectStore, StorageError, WriteRequest};
use google_cloud_storage::client::{Storage, StorageControl};
use google_cloud_storage::model::Object;
use google_cloud_storage::streaming_source::StreamingSource;
use google_cloud_wkt::FieldMask;
use tracing::{debug, error, info, instrument};

use crate::auth::{CredentialSource, load_credentials};
use crate::config::GcsConfig;
use crate::error::{GcpError, classify_gcp_error};

/// ACL applied by [`GcsObjectStore::make_public`].
const PUBLIC_READ_ACL: &str = "publicRead";

/// Adapts a [`ByteStream`] to the client's streaming upload source.
struct BodySource(ByteStream);

impl StreamingSource for BodySource {
    type Error = std::io::Error;

    async fn next(&mut self) -> Option<Result<Bytes, Self::Error>> {
        self.0.next().await
    }
}

/// Google Cloud Storage backend.
///
/// Holds one `Storage` client for object writes and one `StorageControl`
/// client for metadata updates; both are built once and shared by every
/// file the publisher handles.
pub struct GcsObjectStore {
    config: GcsConfig,
    storage: Storage,
    control: StorageControl,
}

impl std::fmt::Debug for GcsObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsObjectStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GcsObjectStore {
    /// Create a new `GcsObjectStore` by building Cloud Storage clients.
    pub async fn new(config: GcsConfig) -> Result<Self, GcpError> {
        let credentials = load_credentials(CredentialSource::for_config(&config)).await?;

        // Build the Storage client (for object writes).
        let mut storage_builder = Storage::builder();
        if let Some(ref endpoint) = config.endpoint_url {
            storage_builder = storage_builder.with_endpoint(endpoint);
        }
        if let Some(ref creds) = credentials {
            storage_builder = storage_builder.with_credentials(creds.clone());
        }
        let storage = storage_builder
            .build()
            .await
            .map_err(|e| GcpError::Configuration(format!("Cloud Storage client error: {e}")))?;

        // Build the StorageControl client (for ACL updates).
        let mut control_builder = StorageControl::builder();
        if let Some(ref endpoint) = config.endpoint_url {
            control_builder = control_builder.with_endpoint(endpoint);
        }
        if let Some(ref creds) = credentials {
            control_builder = control_builder.with_credentials(creds.clone());
        }
        let control = control_builder.build().await.map_err(|e| {
            GcpError::Configuration(format!("Cloud Storage control client error: {e}"))
        })?;

        info!(bucket = %config.bucket, project_id = ?config.project_id, "Cloud Storage clients ready");

        Ok(Self {
            config,
            storage,
            control,
        })
    }

    /// Format a bucket name into the Cloud Storage v2 resource path.
    fn bucket_path(bucket: &str) -> String {
        format!("projects/_/buckets/{bucket}")
    }

    fn object_info(&self, key: &str, object: &Object) -> ObjectInfo {
        ObjectInfo {
            bucket: self.config.bucket.clone(),
            key: key.to_owned(),
            size: u64::try_from(object.size).unwrap_or_default(),
            content_encoding: Some(object.content_encoding.clone()).filter(|e| !e.is_empty()),
        }
    }

    /// Write a body through the streaming upload path.
    async fn send_stream(
        &self,
        key: &str,
        metadata: &UploadMetadata,
        resumable: bool,
        body: ByteStream,
    ) -> Result<ObjectInfo, StorageError> {
        let bucket_path = Self::bucket_path(&self.config.bucket);

        let mut write_request = self
            .storage
            .write_object(&bucket_path, key, BodySource(body));
        if let Some(ref content_type) = metadata.content_type {
            write_request = write_request.set_content_type(content_type);
        }
        if let Some(ref content_encoding) = metadata.content_encoding {
            write_request = write_request.set_content_encoding(content_encoding);
        }
        if let Some(ref cache_control) = metadata.cache_control {
            write_request = write_request.set_cache_control(cache_control);
        }
        if resumable {
            write_request = write_request.with_resumable_upload_threshold(0_usize);
        }

        let object = Box::pin(write_request.send_buffered())
            .await
            .map_err(|e| upload_error(key, &e.to_string()))?;

        Ok(self.object_info(key, &object))
    }
}

/// Log and classify a failed upload.
fn upload_error(key: &str, err_str: &str) -> StorageError {
    error!(key = %key, error = %err_str, "Cloud Storage upload failed");
    classify_gcp_error(err_str).into()
}

/// Drain a body and gzip it in memory.
async fn gzip_body(body: ByteStream) -> Result<Bytes, StorageError> {
    let raw = body
        .try_fold(BytesMut::new(), |mut buf, chunk| async move {
            buf.extend_from_slice(&chunk);
            Ok(buf)
        })
        .await?;
    gzip_bytes(&raw)
}

fn gzip_bytes(raw: &[u8]) -> Result<Bytes, StorageError> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(raw.len() / 2), Compression::default());
    encoder.write_all(raw)?;
    Ok(Bytes::from(encoder.finish()?))
}

/// Metadata to store when the client gzips the body itself.
fn gzip_metadata(metadata: &UploadMetadata) -> UploadMetadata {
    UploadMetadata {
        content_encoding: Some(GZIP_ENCODING.to_owned()),
        ..metadata.clone()
    }
}

fn single_chunk(bytes: Bytes) -> ByteStream {
    Box::pin(futures::stream::iter([Ok(bytes)]))
}

impl ObjectStore for GcsObjectStore {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "gcs"
    }

    #[instrument(skip(self, request, body), fields(key = %request.key, bucket = %self.config.bucket))]
    async fn write_object(
        &self,
        request: WriteRequest,
        body: ByteStream,
    ) -> Result<ObjectInfo, StorageError> {
        let key = request.key.as_str();

        // Already-encoded content is sent as is.
        if request.gzip && !request.metadata.is_gzip() {
            debug!("compressing body before upload");
            let compressed = gzip_body(body).await?;
            let metadata = gzip_metadata(&request.metadata);
            return self
                .send_stream(key, &metadata, request.resumable, single_chunk(compressed))
                .await;
        }

        debug!("streaming object");
        self.send_stream(key, &request.metadata, request.resumable, body)
            .await
    }

    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    async fn make_public(&self, key: &str) -> Result<(), StorageError> {
        let bucket_path = Self::bucket_path(&self.config.bucket);
        debug!("applying {PUBLIC_READ_ACL} ACL");

        self.control
            .update_object()
            .set_object(Object::new().set_bucket(bucket_path).set_name(key))
            .set_update_mask(FieldMask::default().set_paths(["acl"]))
            .set_predefined_acl(PUBLIC_READ_ACL)
            .send()
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                error!(key = %key, error = %err_str, "Cloud Storage ACL update failed");
                StorageError::from(classify_gcp_error(&err_str))
            })?;

        Ok(())
    }

    #[instrument(skip(self, request), fields(key = %request.key, bucket = %self.config.bucket))]
    async fn upload_file(
        &self,
        local_path: &Path,
        request: WriteRequest,
    ) -> Result<ObjectInfo, StorageError> {
        let key = request.key.as_str();

        if request.gzip && !request.metadata.is_gzip() {
            let raw = tokio::fs::read(local_path).await?;
            let compressed = gzip_bytes(&raw)?;
            let metadata = gzip_metadata(&request.metadata);
            return self
                .send_stream(key, &metadata, request.resumable, single_chunk(compressed))
                .await;
        }

        let payload = tokio::fs::File::open(local_path).await?;
        let bucket_path = Self::bucket_path(&self.config.bucket);
        debug!(path = %local_path.display(), "uploading local file");

        let mut write_request = self.storage.write_object(&bucket_path, key, payload);
        if let Some(ref content_type) = request.metadata.content_type {
            write_request = write_request.set_content_type(content_type);
        }
        if let Some(ref content_encoding) = request.metadata.content_encoding {
            write_request = write_request.set_content_encoding(content_encoding);
        }
        if let Some(ref cache_control) = request.metadata.cache_control {
            write_request = write_request.set_cache_control(cache_control);
        }
        if request.resumable {
            write_request = write_request.with_resumable_upload_threshold(0_usize);
        }

        let object = Box::pin(write_request.send_unbuffered())
            .await
            .map_err(|e| upload_error(key, &e.to_string()))?;

        Ok(self.object_info(key, &object))
    }
}
