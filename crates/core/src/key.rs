use std::fmt;

use serde::{Deserialize, Serialize};

use crate::file::{FileRecord, strip_gzip_suffix};

/// Object key of an uploaded file inside its bucket.
///
/// Keys built by [`normalize_destination`] are slash-separated and never
/// start with `/`; keys from [`DestinationKey::from_raw`] are used verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationKey(String);

impl DestinationKey {
    /// Wrap an already computed key, normalizing separators and leading slashes.
    pub fn new(key: impl Into<String>) -> Self {
        let key: String = key.into();
        Self(key.replace('\\', "/").trim_start_matches('/').to_owned())
    }

    /// Wrap a key exactly as given.
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DestinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DestinationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Path of the file relative to its record base, `.gz` stripped, with `/`
/// separators and no leading slash.
fn relative_path(file: &FileRecord) -> String {
    let path = strip_gzip_suffix(&file.path);
    let relative = path.strip_prefix(&file.base).unwrap_or(&path);
    relative
        .to_string_lossy()
        .replace('\\', "/")
        .trim_start_matches('/')
        .to_owned()
}

/// Compute the bucket key for a file below `base_path`.
///
/// `base_path` variants `"test"`, `"/test"`, `"test/"` and `"/test/"` all
/// produce `test/<relative>`; an empty base produces the bare relative path.
pub fn normalize_destination(base_path: &str, file: &FileRecord) -> DestinationKey {
    let base = base_path.replace('\\', "/");
    let base = base.trim_matches('/');
    let base = if base.is_empty() {
        String::new()
    } else {
        format!("{base}/")
    };

    DestinationKey::new(format!("{base}{}", relative_path(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn css() -> FileRecord {
        FileRecord::new("/test/file.css", "/test/", "body")
    }

    #[test]
    fn empty_base_yields_relative_path() {
        assert_eq!(normalize_destination("", &css()).as_str(), "file.css");
    }

    #[test]
    fn base_slash_variants_are_equivalent() {
        for base in ["test", "/test", "test/", "/test/"] {
            assert_eq!(
                normalize_destination(base, &css()).as_str(),
                "test/file.css",
                "base {base:?}"
            );
        }
    }

    #[test]
    fn repeated_slashes_around_base_collapse() {
        for base in ["test//", "//test", "//test//"] {
            assert_eq!(
                normalize_destination(base, &css()).as_str(),
                "test/file.css",
                "base {base:?}"
            );
        }
        assert_eq!(normalize_destination("/", &css()).as_str(), "file.css");
    }

    #[test]
    fn raw_keys_are_kept_verbatim() {
        assert_eq!(DestinationKey::from_raw(r"//raw\file.css").as_str(), r"//raw\file.css");
    }

    #[test]
    fn nested_paths_keep_directories() {
        let file = FileRecord::new("/site/dist/js/app.js", "/site/dist", "x");
        assert_eq!(
            normalize_destination("assets", &file).as_str(),
            "assets/js/app.js"
        );
    }

    #[test]
    fn gz_suffix_is_stripped_from_key() {
        let file = FileRecord::new("/test/file.css.gz", "/test/", "x");
        assert_eq!(
            normalize_destination("assets/", &file).as_str(),
            "assets/file.css"
        );
    }

    #[test]
    fn base_without_trailing_slash_on_record() {
        let file = FileRecord::new("/test/file.css", "/test", "x");
        assert_eq!(normalize_destination("", &file).as_str(), "file.css");
        assert_eq!(normalize_destination("a", &file).as_str(), "a/file.css");
    }

    #[test]
    fn path_outside_base_uses_whole_path() {
        let file = FileRecord::new("/other/file.css", "/test/", "x");
        assert_eq!(normalize_destination("", &file).as_str(), "other/file.css");
    }

    #[test]
    fn backslashes_become_slashes() {
        let key = DestinationKey::new(r"\assets\css\site.css");
        assert_eq!(key.as_str(), "assets/css/site.css");

        assert_eq!(
            normalize_destination(r"static\v1", &css()).as_str(),
            "static/v1/file.css"
        );
    }

    #[test]
    fn display_and_serde_are_plain_strings() {
        let key = normalize_destination("b", &css());
        assert_eq!(key.to_string(), "b/file.css");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"b/file.css\"");
    }
}
