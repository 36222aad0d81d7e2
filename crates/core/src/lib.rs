//! Core types for publishing pipeline files to a cloud storage bucket.
//!
//! - [`config`]: publish options, validation into [`PublishConfig`]
//! - [`file`]: the [`FileRecord`] flowing through the pipeline
//! - [`metadata`]: [`UploadMetadata`] derivation from a file's path and hints
//! - [`key`]: [`DestinationKey`] normalization relative to a base path

pub mod config;
pub mod error;
pub mod file;
pub mod key;
pub mod metadata;

pub use config::{
    DestinationTransform, MetadataOptions, PublishConfig, PublishConfigBuilder, PublishOptions,
};
pub use error::ConfigError;
pub use file::{ByteStream, FileContents, FileRecord, has_gzip_suffix, strip_gzip_suffix};
pub use key::{DestinationKey, normalize_destination};
pub use metadata::{GZIP_ENCODING, UploadMetadata, derive_metadata};
