use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use futures::stream;

/// A boxed stream of file bytes, as handed to the storage collaborator.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + Sync>>;

/// The contents carried by a [`FileRecord`].
#[derive(Default)]
pub enum FileContents {
    /// No contents (a directory entry or a record that was only stat-ed).
    #[default]
    Null,
    /// Contents fully loaded in memory.
    Buffer(Bytes),
    /// Contents produced lazily as a byte stream.
    Stream(ByteStream),
}

impl FileContents {
    /// Build streaming contents from any compatible stream.
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + Sync + 'static,
    {
        Self::Stream(Box::pin(stream))
    }

    /// Consume the contents as a byte stream. `Null` yields an empty stream.
    pub fn into_stream(self) -> ByteStream {
        match self {
            Self::Null => Box::pin(stream::empty()),
            Self::Buffer(bytes) => Box::pin(stream::iter([Ok(bytes)])),
            Self::Stream(s) => s,
        }
    }
}

impl fmt::Debug for FileContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Bytes> for FileContents {
    fn from(bytes: Bytes) -> Self {
        Self::Buffer(bytes)
    }
}

impl From<Vec<u8>> for FileContents {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Buffer(Bytes::from(bytes))
    }
}

impl From<&'static str> for FileContents {
    fn from(text: &'static str) -> Self {
        Self::Buffer(Bytes::from_static(text.as_bytes()))
    }
}

/// One file flowing through the publish pipeline.
///
/// `path` is the absolute path of the file and `base` the directory the
/// pipeline considers its root; the destination key is derived from the part
/// of `path` below `base`.
#[derive(Debug)]
pub struct FileRecord {
    pub path: PathBuf,
    pub base: PathBuf,
    pub contents: FileContents,
    /// Content-encoding hints attached upstream (e.g. by a compression step).
    pub content_encoding: Vec<String>,
}

impl FileRecord {
    /// Create a record with the given path, base and contents.
    pub fn new(
        path: impl Into<PathBuf>,
        base: impl Into<PathBuf>,
        contents: impl Into<FileContents>,
    ) -> Self {
        Self {
            path: path.into(),
            base: base.into(),
            contents: contents.into(),
            content_encoding: Vec::new(),
        }
    }

    /// Add a content-encoding hint.
    #[must_use]
    pub fn with_content_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.content_encoding.push(encoding.into());
        self
    }

    /// Return this record with a different path. Everything else is kept.
    #[must_use]
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..self
        }
    }

    /// Return this record with different contents.
    #[must_use]
    pub fn with_contents(self, contents: impl Into<FileContents>) -> Self {
        Self {
            contents: contents.into(),
            ..self
        }
    }

    /// `true` when the record carries nothing to upload.
    pub fn is_null(&self) -> bool {
        match &self.contents {
            FileContents::Null => true,
            FileContents::Buffer(bytes) => bytes.is_empty(),
            FileContents::Stream(_) => false,
        }
    }

    /// `true` when any content-encoding hint mentions gzip.
    pub fn has_gzip_hint(&self) -> bool {
        self.content_encoding.iter().any(|hint| hint.contains("gzip"))
    }

    /// The path with any trailing `.gz` removed.
    pub fn logical_path(&self) -> PathBuf {
        strip_gzip_suffix(&self.path)
    }
}

/// `true` if the path's final extension is `gz`.
pub fn has_gzip_suffix(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Strip one trailing `.gz` from the path, if present.
///
/// The bytes stay gzip-encoded; only the stored name loses the suffix.
pub fn strip_gzip_suffix(path: &Path) -> PathBuf {
    if has_gzip_suffix(path) {
        path.with_extension("")
    } else {
        path.to_path_buf()
    }
}
