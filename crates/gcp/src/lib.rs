//! Google Cloud Storage backend for gcs-publish.
//!
//! - [`GcsConfig`]: bucket, project ID, credentials path and an optional
//!   endpoint URL override
//! - [`GcsObjectStore`] (`storage` feature): the [`ObjectStore`] used by the
//!   publisher in production
//!
//! [`ObjectStore`]: gcs_publish_storage::ObjectStore

pub mod auth;
pub mod config;
pub mod error;

#[cfg(feature = "storage")]
pub mod storage;

// Re-exports for convenience.
pub use config::GcsConfig;
pub use error::{GcpError, classify_gcp_error};

#[cfg(feature = "storage")]
pub use storage::GcsObjectStore;
