//! Single-line heading detection.
//!
//! Only `<h1>`, `<h2>` and `<h3>` are recognized. A heading must open and
//! close on the same line; one split across lines is not a heading.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Opening tag of a level 1-3 heading, attributes allowed.
static OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h([1-3])(?:\s[^>]*)?>").unwrap());

/// Closing tags, indexed by level - 1.
static CLOSE_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)</h1\s*>").unwrap(),
        Regex::new(r"(?i)</h2\s*>").unwrap(),
        Regex::new(r"(?i)</h3\s*>").unwrap(),
    ]
});

/// Any inline tag, for plain-text extraction.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Heading level recognized by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeadingLevel {
    /// `<h1>`
    H1,
    /// `<h2>`
    H2,
    /// `<h3>`, the section boundary.
    H3,
}

impl HeadingLevel {
    /// Numeric level (1-3).
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::H1 => 1,
            Self::H2 => 2,
            Self::H3 => 3,
        }
    }

    fn from_digit(digit: &str) -> Option<Self> {
        match digit {
            "1" => Some(Self::H1),
            "2" => Some(Self::H2),
            "3" => Some(Self::H3),
            _ => None,
        }
    }

    fn close_re(self) -> &'static Regex {
        &CLOSE_RES[usize::from(self.as_u8() - 1)]
    }
}

/// A heading found on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading<'a> {
    /// Heading level.
    pub level: HeadingLevel,
    /// Raw markup between the opening and closing tags.
    pub text: &'a str,
    /// Byte range of `text` within the classified line.
    pub inner: Range<usize>,
}

impl Heading<'_> {
    /// Heading text with nested tags removed and surrounding whitespace trimmed.
    #[must_use]
    pub fn plain_text(&self) -> String {
        TAG_RE.replace_all(self.text, "").trim().to_owned()
    }
}

/// Classify a line as a heading.
///
/// Looks at the first `<h1>`/`<h2>`/`<h3>` opening tag on the line (any case,
/// attributes tolerated) and returns the markup up to its matching closing
/// tag. Returns `None` if there is no opening tag or the tag is not closed on
/// the same line.
///
/// # Examples
///
/// ```
/// use fragdoc_renderer::{HeadingLevel, classify};
///
/// let heading = classify(r#"<H3 class="news">2008.01.01</H3>"#).unwrap();
/// assert_eq!(heading.level, HeadingLevel::H3);
/// assert_eq!(heading.text, "2008.01.01");
///
/// assert!(classify("<h2>Unterminated").is_none());
/// ```
#[must_use]
pub fn classify(line: &str) -> Option<Heading<'_>> {
    let caps = OPEN_RE.captures(line)?;
    let open = caps.get(0)?;
    let level = HeadingLevel::from_digit(&caps[1])?;

    let close = level.close_re().find_at(line, open.end())?;
    let inner = open.end()..close.start();

    Some(Heading {
        level,
        text: &line[inner.clone()],
        inner,
    })
}
