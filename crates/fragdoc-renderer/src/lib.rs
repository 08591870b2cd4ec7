//! Line-level fragment rendering for fragdoc.
//!
//! Fragments are flat HTML snippets that get embedded into a shared page
//! shell. This crate turns a fragment's lines into the lines that are
//! actually emitted, one line at a time:
//!
//! - [`classify`]: detects `<h1>`..`<h3>` headings on a single line
//! - [`TitleExtractor`]: picks the page title (first `<h1>`, else first `<h2>`)
//! - [`Paginator`]: windowed "what's new" summary and "history" drill-down
//! - [`LinkRewriter`]: routes relative links through the front controller
//!
//! [`FragmentPipeline`] wires these together over a line sequence.
//!
//! # Example
//!
//! ```
//! use fragdoc_renderer::{
//!     FragmentPipeline, LinkRewriter, PaginationMode, PaginatorConfig, PipelineRequest,
//! };
//!
//! let rewriter = LinkRewriter::new("index.php");
//! let pipeline = FragmentPipeline::new(rewriter, PaginatorConfig::default());
//!
//! let request = PipelineRequest {
//!     target: "docs/intro.html",
//!     mode: PaginationMode::Plain,
//!     about: None,
//!     default_title: "Home",
//! };
//! let fragment = "<h1>Intro</h1>\n<a href=\"next.html\">next</a>";
//! let output = pipeline.render(&request, fragment.lines());
//!
//! assert_eq!(output.title, "Intro");
//! assert_eq!(output.lines[1], r#"<a href="index.php?q=docs/next.html">next</a>"#);
//! ```

mod heading;
mod links;
mod paginator;
mod pipeline;
mod title;
mod util;

pub use heading::{Heading, HeadingLevel, classify};
pub use links::{
    LinkRewriter, directory_prefix, is_external, prefix_hrefs, prefix_image_sources,
    route_page_links,
};
pub use paginator::{
    LineAction, PaginationMode, Paginator, PaginatorConfig, PaginatorState, controller_link,
};
pub use pipeline::{FragmentPipeline, PipelineRequest, RenderContext, RenderOutput};
pub use title::TitleExtractor;
pub use util::escape_html;
