//! Request-level page rendering.
//!
//! [`Site`] is the boundary between untrusted requests and the fragment
//! renderer: it resolves the default target, turns every failure into a
//! minimal error page and records each served page in an [`AccessLog`].
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use fragdoc_site::{RenderRequest, Site, SiteConfig, TracingAccessLog};
//! use fragdoc_storage::FsStorage;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("htdocs")));
//! let site = Site::new(storage, SiteConfig::default()).with_access_log(TracingAccessLog);
//!
//! let page = site.render(&RenderRequest::from_query("q=history.html", "history.html"));
//! println!("{}", page.body());
//! ```

use std::sync::Arc;

use chrono::Utc;
use fragdoc_storage::Storage;
use serde::Serialize;

use crate::access_log::{AccessLog, AccessRecord, NullAccessLog};
use crate::renderer::{FragmentRenderer, FragmentRendererConfig, RenderError};
use crate::request::{RenderRequest, ViewMode};

/// Outcome of serving a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    /// The fragment was rendered.
    Ok,
    /// No such fragment.
    NotFound,
    /// The target was rejected.
    Invalid,
    /// The fragment exists but could not be read.
    Unavailable,
}

impl PageStatus {
    /// Name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotFound => "not_found",
            Self::Invalid => "invalid",
            Self::Unavailable => "unavailable",
        }
    }

    /// Whether the requested fragment was served.
    #[must_use]
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl From<&RenderError> for PageStatus {
    fn from(err: &RenderError) -> Self {
        match err {
            RenderError::TargetNotFound(_) => Self::NotFound,
            RenderError::InvalidTarget { .. } => Self::Invalid,
            RenderError::Storage(_) => Self::Unavailable,
        }
    }
}

/// A page ready to be inserted into the shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPage {
    /// Target as resolved (after defaulting).
    pub target: String,
    /// Requested view.
    pub mode: ViewMode,
    /// Body lines.
    pub lines: Vec<String>,
    /// Page title, never empty.
    pub title: String,
    /// Outcome.
    pub status: PageStatus,
}

impl RenderedPage {
    /// Body lines joined with newlines.
    #[must_use]
    pub fn body(&self) -> String {
        self.lines.join("\n")
    }
}

/// Configuration for [`Site`].
#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// Fragment renderer configuration.
    pub renderer: FragmentRendererConfig,
    /// Target rendered when the request names none.
    pub default_target: String,
    /// Body of the page served when rendering fails.
    pub not_found_message: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            renderer: FragmentRendererConfig::default(),
            default_target: "history.html".to_owned(),
            not_found_message: "<p>The requested page does not exist.</p>".to_owned(),
        }
    }
}

/// Serves pages from a fragment store.
pub struct Site {
    renderer: FragmentRenderer,
    access_log: Box<dyn AccessLog>,
    default_target: String,
    not_found_message: String,
}

impl Site {
    /// Create a site over `storage`. Access logging is disabled until
    /// [`Site::with_access_log`] is called.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: SiteConfig) -> Self {
        Self {
            renderer: FragmentRenderer::new(storage, config.renderer),
            access_log: Box::new(NullAccessLog),
            default_target: config.default_target,
            not_found_message: config.not_found_message,
        }
    }

    /// Record served pages in `access_log`.
    #[must_use]
    pub fn with_access_log(mut self, access_log: impl AccessLog + 'static) -> Self {
        self.access_log = Box::new(access_log);
        self
    }

    /// Target rendered when the request names none.
    #[must_use]
    pub fn default_target(&self) -> &str {
        &self.default_target
    }

    /// Render a page, propagating failures.
    ///
    /// Does not write to the access log.
    ///
    /// # Errors
    ///
    /// Returns the [`RenderError`] from the fragment renderer.
    pub fn try_render(&self, request: &RenderRequest) -> Result<RenderedPage, RenderError> {
        let target = self.resolve_target(request);
        let fragment = self.renderer.render(target, request.mode)?;
        Ok(RenderedPage {
            target: target.to_owned(),
            mode: request.mode,
            lines: fragment.lines,
            title: fragment.title,
            status: PageStatus::Ok,
        })
    }

    /// Render a page. Never fails: errors produce a minimal error page.
    ///
    /// Every call is recorded in the access log; access log failures are
    /// logged and otherwise ignored.
    pub fn render(&self, request: &RenderRequest) -> RenderedPage {
        let page = self.try_render(request).unwrap_or_else(|err| {
            tracing::warn!(page = %request.target, error = %err, "Serving error page");
            self.error_page(request, &err)
        });

        let record = AccessRecord {
            timestamp: Utc::now(),
            target: &page.target,
            mode: page.mode,
            title: &page.title,
            status: page.status,
        };
        if let Err(e) = self.access_log.record(&record) {
            tracing::warn!(error = %e, "Failed to write access log");
        }

        page
    }

    fn resolve_target<'a>(&'a self, request: &'a RenderRequest) -> &'a str {
        if request.target.trim().is_empty() {
            &self.default_target
        } else {
            &request.target
        }
    }

    fn error_page(&self, request: &RenderRequest, err: &RenderError) -> RenderedPage {
        RenderedPage {
            target: self.resolve_target(request).to_owned(),
            mode: request.mode,
            lines: self.not_found_message.lines().map(str::to_owned).collect(),
            title: self.renderer.default_title().to_owned(),
            status: PageStatus::from(err),
        }
    }
}
