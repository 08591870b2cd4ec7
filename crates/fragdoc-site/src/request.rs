//! Page requests and query-string decoding.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use serde::Serialize;

/// Query parameter naming the target fragment.
const TARGET_PARAM: &str = "q";
/// Query parameter selecting the view.
const MODE_PARAM: &str = "m";
/// Value of [`MODE_PARAM`] selecting the drill-down view.
const HISTORY_VALUE: &str = "history";

/// View requested by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Normal view (summary on windowed fragments).
    #[default]
    Default,
    /// Drill-down view (`m=history`).
    History,
}

impl ViewMode {
    /// Name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::History => "history",
        }
    }
}

/// A request for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Target identifier, not yet validated. Empty selects the default target.
    pub target: String,
    /// Requested view.
    pub mode: ViewMode,
}

impl RenderRequest {
    /// Create a request.
    #[must_use]
    pub fn new(target: impl Into<String>, mode: ViewMode) -> Self {
        Self {
            target: target.into(),
            mode,
        }
    }

    /// Decode a CGI query string such as `q=sapi/index.html&m=history`.
    ///
    /// Values are percent-decoded with `+` read as a space. Unknown
    /// parameters are ignored; repeated parameters keep the last value. An
    /// absent or blank `q` selects `default_target`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fragdoc_site::{RenderRequest, ViewMode};
    ///
    /// let request = RenderRequest::from_query("q=newjulius.html&m=history", "history.html");
    /// assert_eq!(request.target, "newjulius.html");
    /// assert_eq!(request.mode, ViewMode::History);
    ///
    /// let request = RenderRequest::from_query("", "history.html");
    /// assert_eq!(request.target, "history.html");
    /// ```
    #[must_use]
    pub fn from_query(query: &str, default_target: &str) -> Self {
        let mut target = None;
        let mut mode = ViewMode::Default;

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match decode_component(key).as_ref() {
                TARGET_PARAM => target = Some(decode_component(value).into_owned()),
                MODE_PARAM => {
                    mode = if decode_component(value) == HISTORY_VALUE {
                        ViewMode::History
                    } else {
                        ViewMode::Default
                    };
                }
                _ => {}
            }
        }

        let target = target
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| default_target.to_owned());
        Self { target, mode }
    }
}

/// Percent-decode one query component, reading `+` as a space.
fn decode_component(raw: &str) -> Cow<'_, str> {
    if raw.contains('+') {
        let spaced = raw.replace('+', " ");
        Cow::Owned(percent_decode_str(&spaced).decode_utf8_lossy().into_owned())
    } else {
        percent_decode_str(raw).decode_utf8_lossy()
    }
}
