//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for fragment retrieval, along with
//! [`StorageError`] for unified error handling across backends.
//!
//! # Target Convention
//!
//! All path parameters in Storage methods are **target identifiers**, the same
//! strings that arrive in the `q=` query parameter:
//! - `"history.html"` - fragment at the content root
//! - `"sapi/index.html"` - fragment in a subdirectory
//!
//! Targets are always relative and use `/` as separator. Use
//! [`validate_target`] before handing attacker-controlled input to a backend.

use std::path::PathBuf;

/// Semantic error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Fragment does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid or unsafe target identifier.
    InvalidPath,
    /// Other/unknown error category.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Target context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create an invalid path error with path.
    #[must_use]
    pub fn invalid_path(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::InvalidPath).with_path(path)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            _ => StorageErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: foo/bar.html)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Check that a target identifier is safe to resolve inside a content root.
///
/// Rejects empty targets, absolute paths, backslashes, NUL bytes, empty
/// segments and any `.` or `..` segment.
///
/// # Errors
///
/// Returns [`StorageErrorKind::InvalidPath`] when the target is rejected.
pub fn validate_target(target: &str) -> Result<(), StorageError> {
    let malformed = target.is_empty()
        || target.starts_with('/')
        || target.contains(['\\', '\0'])
        || target
            .split('/')
            .any(|segment| matches!(segment, "" | "." | ".."));

    if malformed {
        return Err(StorageError::invalid_path(target));
    }
    Ok(())
}

/// Content store for fragment retrieval.
///
/// Implementations are read-only: the renderer never writes to the store.
///
/// # Targets
///
/// All path parameters are **target identifiers** (relative, `/`-separated).
/// Implementations must reject targets that escape their content root.
pub trait Storage: Send + Sync {
    /// Read the full text of a fragment.
    ///
    /// # Arguments
    ///
    /// * `target` - target identifier (e.g., "history.html", "sapi/index.html")
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the target is invalid, doesn't exist or
    /// can't be read.
    fn read(&self, target: &str) -> Result<String, StorageError>;

    /// Check if a fragment exists for the given target.
    ///
    /// Returns `false` on errors (treats errors as "doesn't exist").
    fn exists(&self, target: &str) -> bool;
}
