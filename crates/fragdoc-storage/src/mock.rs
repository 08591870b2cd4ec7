//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::storage::{Storage, StorageError, StorageErrorKind, validate_target};

/// Mock storage for testing.
///
/// Stores fragments in memory. Use the builder methods to configure the mock
/// with test data. Targets are validated the same way the filesystem backend
/// validates them, so traversal attempts fail with `InvalidPath`.
///
/// # Example
///
/// ```ignore
/// use fragdoc_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_fragment("guide.html", "<h1>Guide</h1>\n<p>Content.</p>");
///
/// let text = storage.read("guide.html").unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    fragments: RwLock<HashMap<String, String>>,
    reads: RwLock<Vec<String>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment with the given target and text.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_fragment(self, target: impl Into<String>, text: impl Into<String>) -> Self {
        self.fragments
            .write()
            .unwrap()
            .insert(target.into(), text.into());
        self
    }

    /// Add a fragment built from individual lines.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_lines(self, target: impl Into<String>, lines: &[&str]) -> Self {
        self.with_fragment(target, lines.join("\n"))
    }

    /// Targets passed to [`Storage::read`], in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn reads(&self) -> Vec<String> {
        self.reads.read().unwrap().clone()
    }
}

impl Storage for MockStorage {
    fn read(&self, target: &str) -> Result<String, StorageError> {
        validate_target(target).map_err(|e| e.with_backend("Mock"))?;
        self.reads.write().unwrap().push(target.to_owned());
        self.fragments
            .read()
            .unwrap()
            .get(target)
            .cloned()
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::NotFound)
                    .with_path(target)
                    .with_backend("Mock")
            })
    }

    fn exists(&self, target: &str) -> bool {
        validate_target(target).is_ok() && self.fragments.read().unwrap().contains_key(target)
    }
}
