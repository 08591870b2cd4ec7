//! Section windowing over `<h3>`-delimited sections.
//!
//! Two fragments get special treatment: the landing page shows only the
//! newest few sections ("what's new"), with a link to a drill-down view that
//! shows every section without the introductory preamble ("history").
//!
//! ```text
//!             Plain / Summary                      DrillDown
//!                  │                                   │
//!                  ▼                                   ▼
//!             ┌──────────┐  first <h3>          ┌────────────────────┐
//!             │ Scanning │─────────┐            │ SuppressedPreamble │
//!             └──────────┘         │            └────────────────────┘
//!                                  ▼                      │ first <h3>
//!                        ┌──────────────────┐◄────────────┘
//!                        │ EmittingSections │
//!                        └──────────────────┘
//!                                  │ Summary only: count > window
//!                                  ▼
//!                         ┌────────────────┐
//!                         │ WindowExceeded │ (terminal, scan stops)
//!                         └────────────────┘
//! ```
//!
//! Plain mode never leaves `Scanning`.

use std::borrow::Cow;

use crate::heading::{Heading, HeadingLevel};
use crate::util::escape_html;

/// Query parameter value selecting the drill-down view.
const HISTORY_PARAM: &str = "m=history";

/// Which windowing behavior applies to a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationMode {
    /// No filtering: every line is emitted.
    Plain,
    /// Newest-sections window.
    Summary {
        /// Replace the first `<h2>` with the "latest updates" label.
        relabel_first_h2: bool,
    },
    /// Full history without the preamble.
    DrillDown {
        /// Emit an archive heading before the first section.
        archive_heading: bool,
    },
}

impl PaginationMode {
    /// Whether the about fragment is prepended in this mode.
    #[must_use]
    pub fn prepends_about(self) -> bool {
        matches!(self, Self::Summary { .. })
    }

    /// Name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Summary { .. } => "summary",
            Self::DrillDown { .. } => "drilldown",
        }
    }
}

/// Paginator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginatorState {
    /// Emitting lines, no section seen yet (or plain mode).
    Scanning,
    /// Dropping lines until the first section boundary.
    SuppressedPreamble,
    /// Inside the sections.
    EmittingSections,
    /// Summary window is full; no further lines are read.
    WindowExceeded,
}

/// Labels and limits for the windowed views.
///
/// Labels are inserted as HTML without escaping.
#[derive(Debug, Clone)]
pub struct PaginatorConfig {
    /// Number of sections shown in summary mode.
    pub window: usize,
    /// Replacement heading for the landing page's first `<h2>`.
    pub latest_label: String,
    /// Badge appended to the newest section heading.
    pub new_badge: String,
    /// Text of the link from the summary to the drill-down view.
    pub more_label: String,
    /// Text of the link from the drill-down view back to the summary.
    pub back_label: String,
    /// Heading emitted before the first section of the archive drill-down.
    pub archive_heading: String,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            window: 4,
            latest_label: "What's New?".to_owned(),
            new_badge: r##"<font color="#cc0000">New!</font>"##.to_owned(),
            more_label: "-&gt; Past entries".to_owned(),
            back_label: "&lt;- Back".to_owned(),
            archive_heading: "Archive".to_owned(),
        }
    }
}

/// What to do with the current line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction<'a> {
    /// Drop the line.
    Skip,
    /// Emit the (possibly modified) content line.
    Emit(Cow<'a, str>),
    /// Emit a generated line, then the content line.
    Preface {
        /// Generated markup, emitted as-is.
        generated: String,
        /// Content line.
        line: Cow<'a, str>,
    },
    /// Emit a generated line and stop reading.
    Truncate(String),
}

/// Build a front-controller URL for `target`, optionally in drill-down mode.
///
/// The result is escaped for use in a double-quoted attribute.
///
/// # Examples
///
/// ```
/// use fragdoc_renderer::controller_link;
///
/// assert_eq!(controller_link("index.php", "history.html", false), "index.php?q=history.html");
/// assert_eq!(
///     controller_link("index.php", "history.html", true),
///     "index.php?q=history.html&amp;m=history"
/// );
/// ```
#[must_use]
pub fn controller_link(controller: &str, target: &str, history: bool) -> String {
    let mut link = format!("{}?q={}", escape_html(controller), escape_html(target));
    if history {
        link.push_str("&amp;");
        link.push_str(HISTORY_PARAM);
    }
    link
}

/// Section windowing state machine for one render.
#[derive(Debug)]
pub struct Paginator<'r> {
    mode: PaginationMode,
    config: &'r PaginatorConfig,
    controller: &'r str,
    target: &'r str,
    state: PaginatorState,
    section_count: usize,
    h2_relabelled: bool,
}

impl<'r> Paginator<'r> {
    /// Create a paginator for `target`; links route through `controller`.
    #[must_use]
    pub fn new(
        mode: PaginationMode,
        config: &'r PaginatorConfig,
        controller: &'r str,
        target: &'r str,
    ) -> Self {
        let state = match mode {
            PaginationMode::DrillDown { .. } => PaginatorState::SuppressedPreamble,
            PaginationMode::Plain | PaginationMode::Summary { .. } => PaginatorState::Scanning,
        };
        Self {
            mode,
            config,
            controller,
            target,
            state,
            section_count: 0,
            h2_relabelled: false,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PaginatorState {
        self.state
    }

    /// Active mode.
    #[must_use]
    pub fn mode(&self) -> PaginationMode {
        self.mode
    }

    /// Number of section boundaries (`<h3>`) seen so far.
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.section_count
    }

    /// Whether lines are currently being dropped.
    #[must_use]
    pub fn is_suppressing(&self) -> bool {
        self.state == PaginatorState::SuppressedPreamble
    }

    /// Whether the scan must stop.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == PaginatorState::WindowExceeded
    }

    /// Decide what happens to `line`, given its heading classification.
    pub fn feed<'a>(&mut self, line: &'a str, heading: Option<&Heading<'_>>) -> LineAction<'a> {
        let level = heading.map(|h| h.level);
        let is_section = level == Some(HeadingLevel::H3);

        match (self.state, self.mode) {
            (PaginatorState::WindowExceeded, _) => LineAction::Skip,
            (PaginatorState::SuppressedPreamble, PaginationMode::DrillDown { archive_heading }) => {
                if !is_section {
                    return LineAction::Skip;
                }
                self.section_count += 1;
                self.state = PaginatorState::EmittingSections;
                if archive_heading {
                    LineAction::Preface {
                        generated: format!("<h2>{}</h2>", self.config.archive_heading),
                        line: Cow::Borrowed(line),
                    }
                } else {
                    LineAction::Emit(Cow::Borrowed(line))
                }
            }
            (_, PaginationMode::Summary { relabel_first_h2 }) => {
                if level == Some(HeadingLevel::H2) && relabel_first_h2 && !self.h2_relabelled {
                    self.h2_relabelled = true;
                    return LineAction::Emit(Cow::Owned(format!(
                        "<h2>{}</h2>",
                        self.config.latest_label
                    )));
                }
                match heading.filter(|_| is_section) {
                    Some(heading) => self.enter_summary_section(line, heading),
                    None => LineAction::Emit(Cow::Borrowed(line)),
                }
            }
            (_, PaginationMode::DrillDown { .. }) => {
                if is_section {
                    self.section_count += 1;
                }
                LineAction::Emit(Cow::Borrowed(line))
            }
            (_, PaginationMode::Plain) => LineAction::Emit(Cow::Borrowed(line)),
        }
    }

    fn enter_summary_section<'a>(&mut self, line: &'a str, heading: &Heading<'_>) -> LineAction<'a> {
        self.section_count += 1;
        if self.section_count > self.config.window {
            self.state = PaginatorState::WindowExceeded;
            tracing::debug!(
                fragment = %self.target,
                window = self.config.window,
                "Summary window exceeded, truncating"
            );
            return LineAction::Truncate(format!(
                r#"<hr><p><a href="{}">{}</a></p>"#,
                controller_link(self.controller, self.target, true),
                self.config.more_label
            ));
        }
        self.state = PaginatorState::EmittingSections;
        if self.section_count == 1 {
            let end = heading.inner.end;
            return LineAction::Emit(Cow::Owned(format!(
                "{} {}{}",
                &line[..end],
                self.config.new_badge,
                &line[end..]
            )));
        }
        LineAction::Emit(Cow::Borrowed(line))
    }

    /// Trailing line emitted after the scan, if any.
    #[must_use]
    pub fn finish(&self) -> Option<String> {
        match self.mode {
            PaginationMode::DrillDown { .. } => Some(format!(
                r#"<hr><p><a href="{}">{}</a></p>"#,
                controller_link(self.controller, self.target, false),
                self.config.back_label
            )),
            PaginationMode::Plain | PaginationMode::Summary { .. } => None,
        }
    }
}
