use std::io::Write;

use bytes::Bytes;
use gcs_publish_core::{DestinationKey, FileContents, UploadMetadata};

use crate::error::StorageError;
use crate::store::DynObjectStore;
use crate::types::WriteRequest;

fn test_request(key: &str) -> WriteRequest {
    WriteRequest::new(
        DestinationKey::new(key),
        UploadMetadata {
            content_type: Some("text/plain".to_owned()),
            ..UploadMetadata::default()
        },
    )
}

/// Run the storage backend conformance suite.
///
/// Call this from your backend's test module (or an integration test against
/// an emulator) with a fresh store instance.
///
/// # Errors
///
/// Returns an error if any backend operation fails.
pub async fn run_store_conformance_tests(store: &dyn DynObjectStore) -> Result<(), StorageError> {
    test_write_reports_size(store).await?;
    test_write_chunked_stream(store).await?;
    test_write_then_make_public(store).await?;
    test_upload_file(store).await?;
    Ok(())
}

async fn test_write_reports_size(store: &dyn DynObjectStore) -> Result<(), StorageError> {
    let info = store
        .write_object(
            test_request("conformance/size.txt"),
            FileContents::from("twelve bytes").into_stream(),
        )
        .await?;
    assert_eq!(info.key, "conformance/size.txt");
    assert_eq!(info.size, 12, "size should match the streamed body");
    Ok(())
}

async fn test_write_chunked_stream(store: &dyn DynObjectStore) -> Result<(), StorageError> {
    let body = FileContents::stream(futures::stream::iter(
        ["a", "bb", "ccc"].map(|chunk| Ok(Bytes::from_static(chunk.as_bytes()))),
    ));
    let info = store
        .write_object(test_request("conformance/chunks.txt"), body.into_stream())
        .await?;
    assert_eq!(info.size, 6, "all chunks should be written");
    Ok(())
}

async fn test_write_then_make_public(store: &dyn DynObjectStore) -> Result<(), StorageError> {
    store
        .write_object(
            test_request("conformance/public.txt"),
            FileContents::from("public").into_stream(),
        )
        .await?;
    store.make_public("conformance/public.txt").await?;
    Ok(())
}

async fn test_upload_file(store: &dyn DynObjectStore) -> Result<(), StorageError> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(b"from disk")?;

    let info = store
        .upload_file(file.path(), test_request("conformance/file.txt"))
        .await?;
    assert_eq!(info.key, "conformance/file.txt");
    assert_eq!(info.size, 9, "size should match the file on disk");
    Ok(())
}
