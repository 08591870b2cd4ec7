//! Fragment rendering.
//!
//! Provides [`FragmentRenderer`], which chooses the pagination mode for a
//! request, loads the fragment (and the about fragment when needed) from a
//! [`Storage`] backend and runs the line pipeline over it.

use std::sync::Arc;

use fragdoc_renderer::{FragmentPipeline, LinkRewriter, PaginationMode, PaginatorConfig, PipelineRequest};
use fragdoc_storage::{Storage, StorageError, StorageErrorKind, validate_target};

use crate::request::ViewMode;

/// Result of rendering one fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedFragment {
    /// Emitted body lines.
    pub lines: Vec<String>,
    /// Page title.
    pub title: String,
    /// Pagination mode the fragment was rendered in.
    pub mode: PaginationMode,
    /// Section boundaries seen.
    pub sections: usize,
    /// Whether the summary window cut the fragment short.
    pub truncated: bool,
}

/// Error returned when fragment rendering fails.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The fragment does not exist.
    #[error("Fragment not found: {0}")]
    TargetNotFound(String),
    /// The target is not an acceptable identifier.
    #[error("Invalid target {target:?}: {source}")]
    InvalidTarget {
        /// Target as requested.
        target: String,
        /// Validation failure.
        #[source]
        source: StorageError,
    },
    /// Any other storage failure.
    #[error("Storage error: {0}")]
    Storage(#[source] StorageError),
}

impl RenderError {
    fn from_storage(target: &str, err: StorageError) -> Self {
        match err.kind {
            StorageErrorKind::NotFound => Self::TargetNotFound(target.to_owned()),
            StorageErrorKind::InvalidPath => Self::InvalidTarget {
                target: target.to_owned(),
                source: err,
            },
            _ => Self::Storage(err),
        }
    }
}

/// Configuration for [`FragmentRenderer`].
#[derive(Clone, Debug)]
pub struct FragmentRendererConfig {
    /// Link rewriter (front controller and exclusions).
    pub rewriter: LinkRewriter,
    /// Summary and drill-down labels and window.
    pub pagination: PaginatorConfig,
    /// Landing target: summary view relabels its first `<h2>`.
    pub landing: String,
    /// Archive target: drill-down view gets an archive heading.
    pub archive: String,
    /// About fragment prepended in summary view.
    pub about: String,
    /// Title used when a fragment has no `<h1>`/`<h2>`.
    pub default_title: String,
}

impl Default for FragmentRendererConfig {
    fn default() -> Self {
        Self {
            rewriter: LinkRewriter::new("index.php"),
            pagination: PaginatorConfig::default(),
            landing: "history.html".to_owned(),
            archive: "newjulius.html".to_owned(),
            about: "whatisjulius.html".to_owned(),
            default_title: "Julius".to_owned(),
        }
    }
}

/// Renders fragments from storage.
pub struct FragmentRenderer {
    storage: Arc<dyn Storage>,
    pipeline: FragmentPipeline,
    landing: String,
    archive: String,
    about: String,
    default_title: String,
}

impl FragmentRenderer {
    /// Create a renderer reading fragments from `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: FragmentRendererConfig) -> Self {
        Self {
            storage,
            pipeline: FragmentPipeline::new(config.rewriter, config.pagination),
            landing: config.landing,
            archive: config.archive,
            about: config.about,
            default_title: config.default_title,
        }
    }

    /// Title used for pages without headings and for error pages.
    #[must_use]
    pub fn default_title(&self) -> &str {
        &self.default_title
    }

    /// Pagination mode for `target` viewed in `view`.
    ///
    /// Only the landing and archive targets are windowed; everything else,
    /// including a history request for any other target, renders plain.
    #[must_use]
    pub fn mode_for(&self, target: &str, view: ViewMode) -> PaginationMode {
        let is_landing = target == self.landing;
        let is_archive = target == self.archive;
        if !is_landing && !is_archive {
            return PaginationMode::Plain;
        }
        match view {
            ViewMode::Default => PaginationMode::Summary {
                relabel_first_h2: is_landing,
            },
            ViewMode::History => PaginationMode::DrillDown {
                archive_heading: is_archive,
            },
        }
    }

    /// Render `target` in `view`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::InvalidTarget` if the target is rejected before
    /// lookup, `RenderError::TargetNotFound` if no such fragment exists, and
    /// `RenderError::Storage` for other read failures.
    pub fn render(&self, target: &str, view: ViewMode) -> Result<RenderedFragment, RenderError> {
        validate_target(target).map_err(|e| RenderError::from_storage(target, e))?;

        let text = self
            .storage
            .read(target)
            .map_err(|e| RenderError::from_storage(target, e))?;

        let mode = self.mode_for(target, view);
        let about = if mode.prepends_about() {
            self.read_about()
        } else {
            None
        };

        let request = PipelineRequest {
            target,
            mode,
            about: about.as_deref(),
            default_title: &self.default_title,
        };
        let output = self.pipeline.render(&request, text.lines());

        // The landing summary is the home page and keeps the site title.
        let title = if matches!(mode, PaginationMode::Summary { .. }) && target == self.landing {
            self.default_title.clone()
        } else {
            output.title
        };

        Ok(RenderedFragment {
            lines: output.lines,
            title,
            mode,
            sections: output.sections,
            truncated: output.truncated,
        })
    }

    /// Read the about fragment, skipping it on failure.
    fn read_about(&self) -> Option<String> {
        match self.storage.read(&self.about) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(about = %self.about, error = %e, "About fragment unavailable, skipping");
                None
            }
        }
    }
}
