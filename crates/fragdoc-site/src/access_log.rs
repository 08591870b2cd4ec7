//! Access logging infrastructure.
//!
//! Provides a trait for recording served pages and implementations:
//! - [`AccessLog`]: Trait for access log implementations
//! - [`NullAccessLog`]: No-op log (logging disabled)
//! - [`TracingAccessLog`]: Emits one `info` event per page
//! - [`FileAccessLog`]: Appends one JSON object per line to a file

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::request::ViewMode;
use crate::site::PageStatus;

/// One served page.
#[derive(Clone, Debug, Serialize)]
pub struct AccessRecord<'a> {
    /// When the page was served.
    pub timestamp: DateTime<Utc>,
    /// Target as resolved (after defaulting).
    pub target: &'a str,
    /// Requested view.
    pub mode: ViewMode,
    /// Title of the served page.
    pub title: &'a str,
    /// Outcome.
    pub status: PageStatus,
}

/// Error returned when an access record cannot be written.
#[derive(Debug, thiserror::Error)]
pub enum AccessLogError {
    /// I/O error writing the log.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Record serialization failed.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// A previous writer panicked while holding the log.
    #[error("Access log lock poisoned")]
    Poisoned,
}

/// Trait for access log implementations.
///
/// Failures are reported to the caller, which logs and ignores them.
pub trait AccessLog: Send + Sync {
    /// Record one served page.
    fn record(&self, record: &AccessRecord<'_>) -> Result<(), AccessLogError>;
}

/// No-op access log.
#[derive(Debug, Default)]
pub struct NullAccessLog;

impl AccessLog for NullAccessLog {
    fn record(&self, _record: &AccessRecord<'_>) -> Result<(), AccessLogError> {
        Ok(())
    }
}

/// Access log that emits `tracing` events.
#[derive(Debug, Default)]
pub struct TracingAccessLog;

impl AccessLog for TracingAccessLog {
    fn record(&self, record: &AccessRecord<'_>) -> Result<(), AccessLogError> {
        tracing::info!(
            page = %record.target,
            mode = record.mode.as_str(),
            title = %record.title,
            status = record.status.as_str(),
            "Page served"
        );
        Ok(())
    }
}

/// File-based access log.
///
/// Appends records as JSON lines:
/// ```text
/// {"timestamp":"2024-05-01T12:00:00Z","target":"history.html","mode":"default","title":"Julius","status":"ok"}
/// ```
#[derive(Debug)]
pub struct FileAccessLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileAccessLog {
    /// Open (or create) the log at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `AccessLogError::Io` if the file cannot be opened for appending.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AccessLogError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AccessLog for FileAccessLog {
    fn record(&self, record: &AccessRecord<'_>) -> Result<(), AccessLogError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = self.file.lock().map_err(|_| AccessLogError::Poisoned)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
