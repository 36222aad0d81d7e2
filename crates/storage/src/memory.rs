use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use bytes::{Bytes, BytesMut};
use dashmap::DashMap;
use futures::TryStreamExt;
use gcs_publish_core::ByteStream;
use tracing::debug;

use crate::error::StorageError;
use crate::store::ObjectStore;
use crate::types::{ObjectInfo, WriteRequest};

/// An object held by [`MemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,
    pub request: WriteRequest,
    pub public: bool,
}

/// One call received by [`MemoryObjectStore`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// A streamed write, recorded once the body has been drained.
    Write(WriteRequest),
    /// A visibility change.
    MakePublic(String),
    /// A whole-file upload.
    UploadFile(WriteRequest),
}

/// In-memory [`ObjectStore`] backed by a [`DashMap`].
///
/// Records every call so tests can assert ordering, and can be told to fail
/// writes or visibility changes for specific keys. The `gzip` transport flag
/// is recorded but the body is stored as received.
#[derive(Debug)]
pub struct MemoryObjectStore {
    bucket: String,
    objects: DashMap<String, StoredObject>,
    calls: Mutex<Vec<StoreCall>>,
    failing_writes: DashMap<String, String>,
    failing_visibility: Mutex<HashSet<String>>,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl MemoryObjectStore {
    /// Create an empty store reporting the given bucket name.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: DashMap::new(),
            calls: Mutex::new(Vec::new()),
            failing_writes: DashMap::new(),
            failing_visibility: Mutex::new(HashSet::new()),
        }
    }

    /// Make every write to `key` fail with a transfer error carrying `message`.
    pub fn fail_writes_to(&self, key: impl Into<String>, message: impl Into<String>) {
        self.failing_writes.insert(key.into(), message.into());
    }

    /// Make every visibility change on `key` fail.
    pub fn fail_visibility_for(&self, key: impl Into<String>) {
        self.failing_visibility
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.into());
    }

    /// The stored object at `key`, if any.
    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock_calls().clone()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<StoreCall>> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn check_write(&self, key: &str) -> Result<(), StorageError> {
        match self.failing_writes.get(key) {
            Some(message) => Err(StorageError::Transfer(message.value().clone())),
            None => Ok(()),
        }
    }

    fn store(&self, request: WriteRequest, data: Bytes) -> ObjectInfo {
        let info = ObjectInfo {
            bucket: self.bucket.clone(),
            key: request.key.as_str().to_owned(),
            size: data.len() as u64,
            content_encoding: request.metadata.content_encoding.clone(),
        };
        debug!(bucket = %self.bucket, key = %info.key, size = info.size, "stored object in memory");
        self.objects.insert(
            info.key.clone(),
            StoredObject {
                data,
                request,
                public: false,
            },
        );
        info
    }
}

impl ObjectStore for MemoryObjectStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn write_object(
        &self,
        request: WriteRequest,
        body: ByteStream,
    ) -> Result<ObjectInfo, StorageError> {
        let data = body
            .try_fold(BytesMut::new(), |mut buf, chunk| async move {
                buf.extend_from_slice(&chunk);
                Ok(buf)
            })
            .await?
            .freeze();

        self.lock_calls().push(StoreCall::Write(request.clone()));
        self.check_write(request.key.as_str())?;
        Ok(self.store(request, data))
    }

    async fn make_public(&self, key: &str) -> Result<(), StorageError> {
        self.lock_calls().push(StoreCall::MakePublic(key.to_owned()));

        let failing = self
            .failing_visibility
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains(key);
        if failing {
            return Err(StorageError::Transfer(format!(
                "permission denied changing ACL of {key}"
            )));
        }

        let mut object = self
            .objects
            .get_mut(key)
            .ok_or_else(|| StorageError::NotFound(key.to_owned()))?;
        object.public = true;
        Ok(())
    }

    async fn upload_file(
        &self,
        local_path: &Path,
        request: WriteRequest,
    ) -> Result<ObjectInfo, StorageError> {
        let data = tokio::fs::read(local_path).await?;

        self.lock_calls().push(StoreCall::UploadFile(request.clone()));
        self.check_write(request.key.as_str())?;
        Ok(self.store(request, Bytes::from(data)))
    }
}
