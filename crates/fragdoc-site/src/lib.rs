//! Request handling and page rendering for fragdoc.
//!
//! This crate provides:
//! - [`RenderRequest`]: a page request, decoded from a CGI query string
//! - [`FragmentRenderer`]: mode selection and fragment loading over a [`Storage`]
//! - [`Site`]: the request boundary with error pages and access logging
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use fragdoc_site::{PageStatus, RenderRequest, Site, SiteConfig};
//! use fragdoc_storage::FsStorage;
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("guide.html"), "<h1>Guide</h1>\n<a href=\"next.html\">next</a>").unwrap();
//!
//! let site = Site::new(Arc::new(FsStorage::new(dir.path().to_path_buf())), SiteConfig::default());
//! let page = site.render(&RenderRequest::from_query("q=guide.html", "history.html"));
//!
//! assert_eq!(page.status, PageStatus::Ok);
//! assert_eq!(page.title, "Guide");
//! assert_eq!(page.lines[1], r#"<a href="index.php?q=next.html">next</a>"#);
//! ```
//!
//! [`Storage`]: fragdoc_storage::Storage

mod access_log;
mod renderer;
mod request;
mod site;

pub use access_log::{
    AccessLog, AccessLogError, AccessRecord, FileAccessLog, NullAccessLog, TracingAccessLog,
};
pub use renderer::{FragmentRenderer, FragmentRendererConfig, RenderError, RenderedFragment};
pub use request::{RenderRequest, ViewMode};
pub use site::{PageStatus, RenderedPage, Site, SiteConfig};

// Re-export pipeline types used in configuration
pub use fragdoc_renderer::{LinkRewriter, PaginationMode, PaginatorConfig};
