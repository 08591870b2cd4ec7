//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading fragments from a content directory on
//! the local filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};

use crate::storage::{Storage, StorageError, validate_target};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage implementation.
///
/// Resolves target identifiers relative to a content root. Every read is
/// checked twice: the target string is validated up front, then the resolved
/// file is canonicalized and must still live under the canonical root, which
/// also catches symlinks pointing outside it.
///
/// Fragments are decoded from the configured character encoding (UTF-8 by
/// default) into UTF-8 text. A byte order mark overrides the configured
/// encoding.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use fragdoc_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("htdocs"));
/// let text = storage.read("history.html")?;
/// ```
#[derive(Debug, Clone)]
pub struct FsStorage {
    /// Root directory for content fragments.
    root: PathBuf,
    /// Character encoding fragments are stored in.
    encoding: &'static Encoding,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            encoding: UTF_8,
        }
    }

    /// Decode fragments from `encoding` instead of UTF-8.
    #[must_use]
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Character encoding fragments are decoded from.
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Content root this storage reads from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a validated target to a canonical file path inside the root.
    fn resolve(&self, target: &str) -> Result<PathBuf, StorageError> {
        validate_target(target).map_err(|e| e.with_backend(BACKEND))?;

        let root = fs::canonicalize(&self.root)
            .map_err(|e| StorageError::io(e, Some(self.root.clone())).with_backend(BACKEND))?;
        let full_path = fs::canonicalize(root.join(target))
            .map_err(|e| StorageError::io(e, Some(PathBuf::from(target))).with_backend(BACKEND))?;

        if !full_path.starts_with(&root) {
            tracing::warn!(fragment = %target, "Rejected target resolving outside content root");
            return Err(StorageError::invalid_path(target).with_backend(BACKEND));
        }

        if !full_path.is_file() {
            return Err(StorageError::not_found(target).with_backend(BACKEND));
        }

        Ok(full_path)
    }
}

/// Decode fragment bytes, replacing malformed sequences with U+FFFD.
fn decode(bytes: &[u8], encoding: &'static Encoding, target: &str) -> String {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(
            fragment = %target,
            encoding = used.name(),
            "Fragment contains malformed bytes, replaced with U+FFFD"
        );
    }
    text.into_owned()
}

impl Storage for FsStorage {
    fn read(&self, target: &str) -> Result<String, StorageError> {
        let full_path = self.resolve(target)?;
        tracing::debug!(fragment = %target, path = %full_path.display(), "Reading fragment");
        let bytes = fs::read(&full_path)
            .map_err(|e| StorageError::io(e, Some(PathBuf::from(target))).with_backend(BACKEND))?;
        Ok(decode(&bytes, self.encoding, target))
    }

    fn exists(&self, target: &str) -> bool {
        self.resolve(target).is_ok()
    }
}

impl From<&Path> for FsStorage {
    fn from(root: &Path) -> Self {
        Self::new(root.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use encoding_rs::EUC_JP;

    use super::*;
    use crate::storage::StorageErrorKind;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_fs_storage_is_send_sync() {
        assert_send_sync::<FsStorage>();
    }

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_read_existing_file() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("guide.html"), "<h1>Guide</h1>\n<p>x</p>").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let content = storage.read("guide.html").unwrap();

        assert_eq!(content, "<h1>Guide</h1>\n<p>x</p>");
    }

    #[test]
    fn test_read_nested_file() {
        let temp_dir = create_test_dir();
        let sapi_dir = temp_dir.path().join("sapi");
        fs::create_dir(&sapi_dir).unwrap();
        fs::write(sapi_dir.join("index.html"), "<h1>SAPI</h1>").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        assert_eq!(storage.read("sapi/index.html").unwrap(), "<h1>SAPI</h1>");
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let err = storage.read("nonexistent.html").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Fs"));
    }

    #[test]
    fn test_read_directory_is_not_found() {
        let temp_dir = create_test_dir();
        fs::create_dir(temp_dir.path().join("sapi")).unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let err = storage.read("sapi").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
    }

    #[test]
    fn test_read_rejects_parent_traversal() {
        let temp_dir = create_test_dir();
        let content = temp_dir.path().join("content");
        fs::create_dir(&content).unwrap();
        fs::write(temp_dir.path().join("secret.html"), "secret").unwrap();

        let storage = FsStorage::new(content);
        let err = storage.read("../secret.html").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::InvalidPath);
        assert_eq!(err.backend, Some("Fs"));
    }

    #[cfg(unix)]
    #[test]
    fn test_read_rejects_symlink_escape() {
        let temp_dir = create_test_dir();
        let content = temp_dir.path().join("content");
        fs::create_dir(&content).unwrap();
        fs::write(temp_dir.path().join("secret.html"), "secret").unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("secret.html"),
            content.join("link.html"),
        )
        .unwrap();

        let storage = FsStorage::new(content);
        let err = storage.read("link.html").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::InvalidPath);
    }

    #[test]
    fn test_read_euc_jp_fragment() {
        let temp_dir = create_test_dir();
        let (bytes, _, _) = EUC_JP.encode("<h1>音声認識</h1>\n<p>Julius</p>");
        fs::write(temp_dir.path().join("history.html"), &bytes).unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf()).with_encoding(EUC_JP);
        let content = storage.read("history.html").unwrap();

        assert_eq!(content, "<h1>音声認識</h1>\n<p>Julius</p>");
        assert_eq!(storage.encoding(), EUC_JP);
    }

    #[test]
    fn test_read_utf8_bom_overrides_encoding() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("a.html"), "\u{FEFF}<p>音声</p>").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf()).with_encoding(EUC_JP);

        assert_eq!(storage.read("a.html").unwrap(), "<p>音声</p>");
    }

    #[test]
    fn test_read_invalid_utf8_is_lossy() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("legacy.html"), b"<p>\xa4\xa2</p>").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let content = storage.read("legacy.html").unwrap();

        assert!(content.starts_with("<p>"));
        assert!(content.ends_with("</p>"));
        assert!(content.contains('\u{FFFD}'));
    }

    #[test]
    fn test_read_missing_root() {
        let temp_dir = create_test_dir();
        let storage = FsStorage::new(temp_dir.path().join("missing"));

        let err = storage.read("a.html").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
    }

    #[test]
    fn test_exists() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("guide.html"), "x").unwrap();

        let storage = FsStorage::from(temp_dir.path());

        assert!(storage.exists("guide.html"));
        assert!(!storage.exists("missing.html"));
        assert!(!storage.exists("../guide.html"));
    }
}
