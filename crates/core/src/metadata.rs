use serde::{Deserialize, Serialize};

use crate::file::{FileRecord, has_gzip_suffix};

/// Content encoding recorded for gzip-compressed uploads.
pub const GZIP_ENCODING: &str = "gzip";

/// Object metadata sent along with an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    /// MIME type looked up from the file extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// `"gzip"` when the bytes are gzip-encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,

    /// `Cache-Control` header value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
}

impl UploadMetadata {
    /// `true` if the metadata marks the content as gzip-encoded.
    pub fn is_gzip(&self) -> bool {
        self.content_encoding.as_deref() == Some(GZIP_ENCODING)
    }
}

/// Derive the upload metadata for a file.
///
/// The content type is looked up on the path without its `.gz` suffix, so
/// `app.js.gz` is stored as `application/javascript` with gzip encoding.
/// Unknown extensions leave the content type unset.
pub fn derive_metadata(file: &FileRecord, cache_control: Option<&str>) -> UploadMetadata {
    let logical = file.logical_path();
    let content_type = mime_guess::from_path(&logical)
        .first_raw()
        .map(str::to_owned);

    let content_encoding = (file.has_gzip_hint() || has_gzip_suffix(&file.path))
        .then(|| GZIP_ENCODING.to_owned());

    UploadMetadata {
        content_type,
        content_encoding,
        cache_control: cache_control.map(str::to_owned),
    }
}
