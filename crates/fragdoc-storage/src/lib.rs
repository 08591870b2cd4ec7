//! Content store abstraction for fragdoc.
//!
//! This crate provides a [`Storage`] trait that maps a target identifier
//! (a relative path such as `"history.html"` or `"sapi/index.html"`) to the
//! text of a content fragment. This enables:
//!
//! - **Unit testing** of the rendering pipeline without touching the filesystem
//! - **Backend flexibility** for where fragments are kept
//! - **Clean separation** between request handling and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `read()` and `exists()` methods
//! - [`FsStorage`] implementation rooted at a content directory
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use fragdoc_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("htdocs"));
//! let text = storage.read("history.html")?;
//! for line in text.lines() {
//!     println!("{line}");
//! }
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError, StorageErrorKind, validate_target};
