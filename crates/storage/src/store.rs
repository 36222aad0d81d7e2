use std::path::Path;

use async_trait::async_trait;
use gcs_publish_core::ByteStream;

use crate::error::StorageError;
use crate::types::{ObjectInfo, WriteRequest};

/// Storage collaborator the publish stage writes through.
///
/// This trait is **not** object-safe because it uses native `async fn`
/// methods. Use [`DynObjectStore`] behind an `Arc` for dynamic dispatch;
/// every `ObjectStore` implements it through a blanket implementation.
///
/// Implementations own authentication, transport, retries and resumable
/// transfers. Each call addresses an independent object, so a single store
/// is shared by all in-flight files.
pub trait ObjectStore: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &str;

    /// Stream `body` into the object described by `request`.
    ///
    /// Resolves once the backend reports the write as complete.
    fn write_object(
        &self,
        request: WriteRequest,
        body: ByteStream,
    ) -> impl std::future::Future<Output = Result<ObjectInfo, StorageError>> + Send;

    /// Make an existing object readable by unauthenticated clients.
    fn make_public(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Upload a whole local file in one call.
    fn upload_file(
        &self,
        local_path: &Path,
        request: WriteRequest,
    ) -> impl std::future::Future<Output = Result<ObjectInfo, StorageError>> + Send;
}

/// Object-safe storage trait for use behind `Arc<dyn DynObjectStore>`.
///
/// You generally should not implement this trait directly; implement
/// [`ObjectStore`] and rely on the blanket implementation.
#[async_trait]
pub trait DynObjectStore: Send + Sync {
    fn name(&self) -> &str;

    async fn write_object(
        &self,
        request: WriteRequest,
        body: ByteStream,
    ) -> Result<ObjectInfo, StorageError>;

    async fn make_public(&self, key: &str) -> Result<(), StorageError>;

    async fn upload_file(
        &self,
        local_path: &Path,
        request: WriteRequest,
    ) -> Result<ObjectInfo, StorageError>;
}

#[async_trait]
impl<T: ObjectStore + Sync> DynObjectStore for T {
    fn name(&self) -> &str {
        ObjectStore::name(self)
    }

    async fn write_object(
        &self,
        request: WriteRequest,
        body: ByteStream,
    ) -> Result<ObjectInfo, StorageError> {
        ObjectStore::write_object(self, request, body).await
    }

    async fn make_public(&self, key: &str) -> Result<(), StorageError> {
        ObjectStore::make_public(self, key).await
    }

    async fn upload_file(
        &self,
        local_path: &Path,
        request: WriteRequest,
    ) -> Result<ObjectInfo, StorageError> {
        ObjectStore::upload_file(self, local_path, request).await
    }
}
