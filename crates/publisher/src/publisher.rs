use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::{Stream, StreamExt};
use gcs_publish_core::{
    DestinationKey, FileContents, FileRecord, PublishConfig, PublishOptions, UploadMetadata,
    derive_metadata,
};
use gcs_publish_storage::{DynObjectStore, StorageError, WriteRequest};
use tracing::{debug, error, info, instrument};

use crate::error::PublishError;
use crate::state::{UploadState, UploadTracker};

/// Per-file publish stage.
///
/// Each record handed to [`publish`](Self::publish) is uploaded under the key
/// computed from the configured base path, with metadata derived from its
/// name and encoding hints, and optionally made public once the upload has
/// completed. The storage handle is created once and shared by every file.
pub struct Publisher {
    config: PublishConfig,
    store: Arc<dyn DynObjectStore>,
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("config", &self.config)
            .field("store", &self.store.name())
            .finish()
    }
}

impl Publisher {
    /// Create a publisher writing through the given store.
    pub fn new(config: PublishConfig, store: Arc<dyn DynObjectStore>) -> Self {
        Self { config, store }
    }

    /// Validate raw options and create a publisher.
    ///
    /// Fails with [`PublishError::Configuration`] before any file is
    /// processed when the options are incomplete.
    pub fn from_options(
        options: PublishOptions,
        store: Arc<dyn DynObjectStore>,
    ) -> Result<Self, PublishError> {
        let config = PublishConfig::try_from(options)?;
        Ok(Self::new(config, store))
    }

    /// Create a publisher backed by Google Cloud Storage.
    ///
    /// The clients are built once here, using the configured key file or
    /// Application Default Credentials.
    #[cfg(feature = "gcp")]
    pub async fn connect(config: PublishConfig) -> Result<Self, PublishError> {
        use gcs_publish_gcp::{GcsConfig, GcsObjectStore};

        let store = GcsObjectStore::new(GcsConfig::from(&config))
            .await
            .map_err(|e| PublishError::Backend(e.into()))?;
        Ok(Self::new(config, Arc::new(store)))
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Upload one file.
    ///
    /// Records without contents are returned untouched. On success the
    /// returned record has its `.gz` suffix stripped; buffered contents are
    /// kept, streamed contents have been consumed and come back as
    /// [`FileContents::Null`]. On failure the record is dropped.
    #[instrument(skip(self, record), fields(path = %record.path.display()))]
    pub async fn publish(&self, record: FileRecord) -> Result<FileRecord, PublishError> {
        let mut upload = UploadTracker::new();

        if record.is_null() {
            debug!("no contents, forwarding record unchanged");
            upload.advance(UploadState::Succeeded);
            return Ok(record);
        }

        let metadata = derive_metadata(&record, self.config.cache_control());
        let key = self.config.destination_for(&record);
        upload.advance(UploadState::MetadataComputed);

        let logical_path = record.logical_path();
        let (body, forwarded) = match record.contents {
            FileContents::Buffer(bytes) => (
                FileContents::Buffer(bytes.clone()).into_stream(),
                FileContents::Buffer(bytes),
            ),
            FileContents::Stream(stream) => (stream, FileContents::Null),
            FileContents::Null => (FileContents::Null.into_stream(), FileContents::Null),
        };
        let record = FileRecord {
            path: logical_path,
            base: record.base,
            contents: forwarded,
            content_encoding: record.content_encoding,
        };

        upload.advance(UploadState::Uploading);
        let request = self.write_request(&key, metadata);
        if let Err(source) = self.store.write_object(request, body).await {
            return Err(self.upload_failed(&mut upload, &key, source));
        }

        self.complete(&mut upload, &key).await?;
        Ok(record)
    }

    /// Upload a file straight from disk with a single whole-file call.
    ///
    /// `base` plays the same role as [`FileRecord::base`]. The returned record
    /// carries no contents.
    #[instrument(skip(self, path, base), fields(path = %path.as_ref().display()))]
    pub async fn publish_local_file(
        &self,
        path: impl AsRef<Path>,
        base: impl AsRef<Path>,
    ) -> Result<FileRecord, PublishError> {
        let path = path.as_ref();
        let record = FileRecord::new(path, base.as_ref(), FileContents::Null);
        let mut upload = UploadTracker::new();

        let metadata = derive_metadata(&record, self.config.cache_control());
        let key = self.config.destination_for(&record);
        upload.advance(UploadState::MetadataComputed);

        upload.advance(UploadState::Uploading);
        let request = self.write_request(&key, metadata);
        if let Err(source) = self.store.upload_file(path, request).await {
            return Err(self.upload_failed(&mut upload, &key, source));
        }

        self.complete(&mut upload, &key).await?;
        let logical_path: PathBuf = record.logical_path();
        Ok(record.with_path(logical_path))
    }

    /// Publish every record of a stream, one at a time.
    ///
    /// Each item is the outcome for one record; a failed file does not end
    /// the stream. No more than one upload is in flight per stream.
    pub fn publish_all<'a, S>(
        &'a self,
        records: S,
    ) -> impl Stream<Item = Result<FileRecord, PublishError>> + Send + 'a
    where
        S: Stream<Item = FileRecord> + Send + 'a,
    {
        records.then(move |record| self.publish(record))
    }

    fn write_request(&self, key: &DestinationKey, metadata: UploadMetadata) -> WriteRequest {
        WriteRequest::new(key.clone(), metadata)
            .with_gzip(self.config.gzip())
            .with_resumable(self.config.resumable())
    }

    fn upload_failed(
        &self,
        upload: &mut UploadTracker,
        key: &DestinationKey,
        source: StorageError,
    ) -> PublishError {
        upload.advance(UploadState::Failed);
        error!(
            key = %key,
            bucket = %self.config.bucket_name(),
            error = %source,
            "upload failed"
        );
        PublishError::Transport {
            key: key.to_string(),
            source,
        }
    }

    /// Finish an upload whose write has completed: make the object public
    /// when configured, then log the success.
    async fn complete(
        &self,
        upload: &mut UploadTracker,
        key: &DestinationKey,
    ) -> Result<(), PublishError> {
        if self.config.make_public() {
            upload.advance(UploadState::PublicizePending);
            if let Err(source) = self.store.make_public(key.as_str()).await {
                upload.advance(UploadState::Failed);
                error!(
                    key = %key,
                    bucket = %self.config.bucket_name(),
                    error = %source,
                    "failed to make object public"
                );
                return Err(PublishError::VisibilityChange {
                    key: key.to_string(),
                    source,
                });
            }
        }

        upload.advance(UploadState::Succeeded);
        debug_assert!(upload.state().is_terminal());
        info!(
            key = %key,
            bucket = %self.config.bucket_name(),
            public = self.config.make_public(),
            "uploaded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gcs_publish_storage::{MemoryObjectStore, StoreCall};

    use super::*;

    fn publisher(config: PublishConfig) -> (Publisher, Arc<MemoryObjectStore>) {
        let store = Arc::new(MemoryObjectStore::new(config.bucket_name()));
        (Publisher::new(config, store.clone()), store)
    }

    #[tokio::test]
    async fn null_record_is_forwarded_without_upload() {
        let (publisher, store) = publisher(PublishConfig::builder("b").build().unwrap());
        let record = FileRecord::new("/test/empty.css", "/test/", FileContents::Null);

        let out = publisher.publish(record).await.unwrap();
        assert_eq!(out.path, PathBuf::from("/test/empty.css"));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn buffered_contents_are_kept_on_the_forwarded_record() {
        let (publisher, store) = publisher(PublishConfig::builder("b").build().unwrap());
        let record = FileRecord::new("/test/file.css", "/test/", "body{}");

        let out = publisher.publish(record).await.unwrap();
        assert!(matches!(out.contents, FileContents::Buffer(ref b) if b.as_ref() == b"body{}"));
        assert_eq!(store.get("file.css").unwrap().data.as_ref(), b"body{}");
    }

    #[tokio::test]
    async fn streamed_contents_are_consumed() {
        let (publisher, store) = publisher(PublishConfig::builder("b").build().unwrap());
        let contents = FileContents::stream(futures::stream::iter([Ok(bytes::Bytes::from_static(
            b"chunk",
        ))]));
        let record = FileRecord::new("/test/a.txt", "/test/", contents);

        let out = publisher.publish(record).await.unwrap();
        assert!(matches!(out.contents, FileContents::Null));
        assert_eq!(store.get("a.txt").unwrap().data.as_ref(), b"chunk");
    }

    #[tokio::test]
    async fn transport_options_reach_the_store() {
        let config = PublishConfig::builder("b")
            .with_gzip(true)
            .with_resumable(true)
            .with_cache_control("max-age=60")
            .build()
            .unwrap();
        let (publisher, store) = publisher(config);
        publisher
            .publish(FileRecord::new("/test/site.html", "/test/", "<html>"))
            .await
            .unwrap();

        let calls = store.calls();
        let StoreCall::Write(request) = &calls[0] else {
            panic!("expected a write call");
        };
        assert!(request.gzip);
        assert!(request.resumable);
        assert_eq!(request.metadata.cache_control.as_deref(), Some("max-age=60"));
        assert_eq!(request.metadata.content_type.as_deref(), Some("text/html"));
    }

    #[tokio::test]
    async fn debug_names_the_store() {
        let (publisher, _store) = publisher(PublishConfig::builder("b").build().unwrap());
        assert!(format!("{publisher:?}").contains("memory"));
    }
}
