//! Page title extraction.

use crate::heading::{Heading, HeadingLevel};

/// Picks the page title from the headings seen during a scan.
///
/// The first `<h1>` wins and locks the title. The first `<h2>` is kept as a
/// fallback and only used if no `<h1>` is seen by the end of the scan, so an
/// `<h1>` appearing after an `<h2>` still takes priority.
#[derive(Debug, Default, Clone)]
pub struct TitleExtractor {
    h1: Option<String>,
    h2: Option<String>,
}

impl TitleExtractor {
    /// Create an extractor with nothing captured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the heading classified on the current line, if any.
    ///
    /// Headings whose plain text is empty (e.g. an image-only `<h1>`) are ignored.
    pub fn observe(&mut self, heading: Option<&Heading<'_>>) {
        let Some(heading) = heading else { return };
        let slot = match heading.level {
            HeadingLevel::H1 => &mut self.h1,
            HeadingLevel::H2 => &mut self.h2,
            HeadingLevel::H3 => return,
        };
        if slot.is_some() {
            return;
        }
        let text = heading.plain_text();
        if !text.is_empty() {
            *slot = Some(text);
        }
    }

    /// Whether an `<h1>` title has been captured and locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.h1.is_some()
    }

    /// Title captured so far, if any.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.h1.as_deref().or(self.h2.as_deref())
    }

    /// Final title, falling back to `default` when no heading was captured.
    #[must_use]
    pub fn finish(self, default: &str) -> String {
        self.h1
            .or(self.h2)
            .unwrap_or_else(|| default.to_owned())
    }
}
