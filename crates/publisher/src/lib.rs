//! Publish files flowing through a build pipeline to a Google Cloud Storage
//! bucket.
//!
//! A [`Publisher`] is created once per pipeline from a validated
//! [`PublishConfig`] and then handles one [`FileRecord`] at a time:
//!
//! 1. derive [`UploadMetadata`] (content type, gzip encoding, cache control)
//! 2. compute the [`DestinationKey`] relative to the configured base path
//! 3. stream the contents to the storage backend
//! 4. optionally make the object public once the upload has completed
//!
//! ```no_run
//! # async fn run() -> Result<(), gcs_publish::PublishError> {
//! use gcs_publish::{FileRecord, PublishConfig, Publisher};
//!
//! let config = PublishConfig::builder("static-assets")
//!     .with_base_path("assets/")
//!     .with_public(true)
//!     .build()?;
//! let publisher = Publisher::connect(config).await?;
//!
//! let record = FileRecord::new("/site/dist/app.js", "/site/dist/", "console.log(1)");
//! let published = publisher.publish(record).await?;
//! # let _ = published;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod publisher;
pub mod state;

pub use error::PublishError;
pub use publisher::Publisher;
pub use state::UploadState;

pub use gcs_publish_core::{
    ConfigError, DestinationKey, FileContents, FileRecord, PublishConfig, PublishOptions,
    UploadMetadata, derive_metadata, normalize_destination,
};
pub use gcs_publish_storage::{
    DynObjectStore, MemoryObjectStore, ObjectInfo, ObjectStore, StorageError, WriteRequest,
};

#[cfg(feature = "gcp")]
pub use gcs_publish_gcp::{GcsConfig, GcsObjectStore};
