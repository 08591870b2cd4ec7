//! Link and image path rewriting.
//!
//! Fragments are written with paths relative to their own directory, but are
//! served through a single front controller. Each transform here works on a
//! single line and leaves the line untouched when it has nothing to do:
//!
//! - [`prefix_hrefs`]: `href="x"` → `href="dir/x"`, except `href="#anchor"`
//! - [`prefix_image_sources`]: `<img src="x">` → `<img src="dir/x">`
//! - [`route_page_links`]: `href="dir/x.html"` → `href="controller?q=dir/x.html"`
//!
//! [`LinkRewriter::rewrite`] composes them in that order, after checking that
//! the line has no absolute URL and is not excluded.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex, RegexSet};

/// Absolute or external references; lines containing them are never rewritten.
static EXTERNAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://|mailto:").unwrap());

/// A double-quoted `href` attribute, preceded by whitespace or the line start
/// so that `data-href` and similar attributes are not matched.
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(^|\s)href\s*=\s*"([^"]*)""#).unwrap());

/// A double-quoted `src` attribute inside an `<img>` tag.
static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(<img\b[^>]*?\s)src\s*=\s*"([^"]*)""#).unwrap());

/// Link value naming a page: `.htm`/`.html`, optionally followed by an anchor.
static PAGE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.html?(?:#.*)?$").unwrap());

/// Directory part of a target identifier, including the trailing `/`.
///
/// # Examples
///
/// ```
/// use fragdoc_renderer::directory_prefix;
///
/// assert_eq!(directory_prefix("sapi/doc/index.html"), "sapi/doc/");
/// assert_eq!(directory_prefix("history.html"), "");
/// ```
#[must_use]
pub fn directory_prefix(target: &str) -> &str {
    target.rfind('/').map_or("", |i| &target[..=i])
}

/// Whether a line references an absolute `http(s)://` URL or a `mailto:` link.
#[must_use]
pub fn is_external(line: &str) -> bool {
    EXTERNAL_RE.is_match(line)
}

/// Prepend `prefix` to every `href` value that is not an in-page anchor.
#[must_use]
pub fn prefix_hrefs<'a>(line: &'a str, prefix: &str) -> Cow<'a, str> {
    if prefix.is_empty() {
        return Cow::Borrowed(line);
    }
    HREF_RE.replace_all(line, |caps: &Captures| {
        let value = &caps[2];
        if value.starts_with('#') {
            caps[0].to_owned()
        } else {
            format!(r#"{}href="{prefix}{value}""#, &caps[1])
        }
    })
}

/// Prepend `prefix` to every `<img>` `src` value.
#[must_use]
pub fn prefix_image_sources<'a>(line: &'a str, prefix: &str) -> Cow<'a, str> {
    if prefix.is_empty() {
        return Cow::Borrowed(line);
    }
    IMG_SRC_RE.replace_all(line, |caps: &Captures| {
        format!(r#"{}src="{prefix}{}""#, &caps[1], &caps[2])
    })
}

/// Route every `href` naming an `.htm`/`.html` page through `controller`.
///
/// The value is passed verbatim as the `q` query parameter, so any directory
/// prefix must already be applied.
#[must_use]
pub fn route_page_links<'a>(line: &'a str, controller: &str) -> Cow<'a, str> {
    HREF_RE.replace_all(line, |caps: &Captures| {
        let value = &caps[2];
        if !value.starts_with('#') && PAGE_LINK_RE.is_match(value) {
            format!(r#"{}href="{controller}?q={value}""#, &caps[1])
        } else {
            caps[0].to_owned()
        }
    })
}

/// Apply `transform` to a line, keeping the existing allocation when it is a no-op.
fn apply<'a>(line: Cow<'a, str>, transform: impl FnOnce(&str) -> Cow<'_, str>) -> Cow<'a, str> {
    let rewritten = match transform(&line) {
        Cow::Owned(s) => Some(s),
        Cow::Borrowed(_) => None,
    };
    match rewritten {
        Some(s) => Cow::Owned(s),
        None => line,
    }
}

/// Rewrites relative links in fragment lines so they resolve through the
/// front controller.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    controller: String,
    exclusions: Option<RegexSet>,
}

impl LinkRewriter {
    /// Create a rewriter that routes page links through `controller`
    /// (e.g., `"index.php"`).
    #[must_use]
    pub fn new(controller: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            exclusions: None,
        }
    }

    /// Exclude lines matching any of `patterns` from rewriting.
    ///
    /// Patterns are regular expressions matched case-insensitively anywhere
    /// in the line. Typical use is to leave inline script or template code
    /// alone, e.g. `["php"]`.
    ///
    /// # Errors
    ///
    /// Returns the regex error if any pattern fails to compile.
    pub fn with_exclusions<I, S>(mut self, patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| format!("(?i){}", p.as_ref()))
            .collect();
        self.exclusions = if patterns.is_empty() {
            None
        } else {
            Some(RegexSet::new(patterns)?)
        };
        Ok(self)
    }

    /// Front controller that page links are routed through.
    #[must_use]
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// Whether the exclusion predicate exempts this line from rewriting.
    #[must_use]
    pub fn is_excluded(&self, line: &str) -> bool {
        self.exclusions.as_ref().is_some_and(|set| set.is_match(line))
    }

    /// Rewrite one line for a fragment living under `prefix`.
    ///
    /// Lines containing `http://`, `https://` or `mailto:`, and lines matched
    /// by the exclusion predicate, are returned unchanged.
    #[must_use]
    pub fn rewrite<'a>(&self, line: &'a str, prefix: &str) -> Cow<'a, str> {
        if is_external(line) || self.is_excluded(line) {
            return Cow::Borrowed(line);
        }

        let line = prefix_hrefs(line, prefix);
        let line = apply(line, |l| prefix_image_sources(l, prefix));
        apply(line, |l| route_page_links(l, &self.controller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter() -> LinkRewriter {
        LinkRewriter::new("controller")
    }

    #[test]
    fn test_directory_prefix() {
        assert_eq!(directory_prefix("a/b/c.html"), "a/b/");
        assert_eq!(directory_prefix("a/c.html"), "a/");
        assert_eq!(directory_prefix("c.html"), "");
    }

    #[test]
    fn test_external_lines_unchanged() {
        let lines = [
            r#"<a href="http://example.com/a.html">x</a> <a href="b.html">y</a>"#,
            r#"<a href="HTTPS://example.com/">x</a>"#,
            r#"<a href="mailto:someone@example.com">mail</a>"#,
            r#"<img src="pic.png"> see http://example.com"#,
        ];
        for line in lines {
            assert_eq!(rewriter().rewrite(line, "bar/"), line);
        }
    }

    #[test]
    fn test_page_link_is_prefixed_and_routed() {
        let out = rewriter().rewrite(r#"<a href="foo.html">Foo</a>"#, "bar/");

        assert_eq!(out, r#"<a href="controller?q=bar/foo.html">Foo</a>"#);
    }

    #[test]
    fn test_page_link_without_prefix_is_routed() {
        let out = rewriter().rewrite(r#"<a href="foo.htm">Foo</a>"#, "");

        assert_eq!(out, r#"<a href="controller?q=foo.htm">Foo</a>"#);
    }

    #[test]
    fn test_page_link_with_anchor_is_routed() {
        let out = rewriter().rewrite(r##"<a href="whatis.html#intro">Intro</a>"##, "");

        assert_eq!(out, r##"<a href="controller?q=whatis.html#intro">Intro</a>"##);
    }

    #[test]
    fn test_anchor_href_never_prefixed() {
        for prefix in ["", "bar/", "a/b/"] {
            let line = r##"<a href="#install">Install</a>"##;
            assert_eq!(rewriter().rewrite(line, prefix), line);
        }
    }

    #[test]
    fn test_anchor_and_page_link_on_same_line() {
        let out = rewriter().rewrite(r##"<a href="#top">top</a> <a href="x.html">x</a>"##, "d/");

        assert_eq!(
            out,
            r##"<a href="#top">top</a> <a href="controller?q=d/x.html">x</a>"##
        );
    }

    #[test]
    fn test_non_page_link_is_prefixed_not_routed() {
        let out = rewriter().rewrite(r#"<a href="files/julius.tar.gz">dl</a>"#, "d/");

        assert_eq!(out, r#"<a href="d/files/julius.tar.gz">dl</a>"#);
    }

    #[test]
    fn test_image_source_prefixed_unconditionally() {
        let out = rewriter().rewrite(r#"<img border="0" src="graphics/logo.png">"#, "d/");

        assert_eq!(out, r#"<img border="0" src="d/graphics/logo.png">"#);
    }

    #[test]
    fn test_image_source_without_prefix_unchanged() {
        let line = r#"<img src="graphics/logo.png">"#;

        assert!(matches!(rewriter().rewrite(line, ""), Cow::Borrowed(_)));
    }

    #[test]
    fn test_line_without_links_unchanged() {
        let line = "<p>Julius is a speech recognition engine.</p>";

        let out = rewriter().rewrite(line, "d/");

        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, line);
    }

    #[test]
    fn test_attribute_spacing_and_case_normalized() {
        let out = rewriter().rewrite(r#"<A HREF = "Doc.HTML">doc</A>"#, "d/");

        assert_eq!(out, r#"<A href="controller?q=d/Doc.HTML">doc</A>"#);
    }

    #[test]
    fn test_hyphenated_href_attribute_untouched() {
        let out = rewriter().rewrite(r#"<div data-href="x.html"><a href="y.html">y</a></div>"#, "d/");

        assert_eq!(
            out,
            r#"<div data-href="x.html"><a href="controller?q=d/y.html">y</a></div>"#
        );
    }

    #[test]
    fn test_href_on_continuation_line() {
        assert_eq!(
            rewriter().rewrite(r#"href="a.html">a</a>"#, ""),
            r#"href="controller?q=a.html">a</a>"#
        );
    }

    #[test]
    fn test_html_in_middle_of_value_not_routed() {
        let out = rewriter().rewrite(r#"<a href="page.html.bak">x</a>"#, "");

        assert_eq!(out, r#"<a href="page.html.bak">x</a>"#);
    }

    #[test]
    fn test_exclusion_predicate() {
        let rewriter = LinkRewriter::new("en_index.php")
            .with_exclusions(["php"])
            .unwrap();
        let line = r#"<a href="en_index.php?q=index-en.html">Home</a>"#;

        assert!(rewriter.is_excluded(line));
        assert_eq!(rewriter.rewrite(line, "d/"), line);
        assert_eq!(
            rewriter.rewrite(r#"<a href="a.html">a</a>"#, ""),
            r#"<a href="en_index.php?q=a.html">a</a>"#
        );
    }

    #[test]
    fn test_exclusion_is_case_insensitive() {
        let rewriter = LinkRewriter::new("c").with_exclusions(["<\\?php"]).unwrap();

        assert!(rewriter.is_excluded("<?PHP echo 1; ?>"));
    }

    #[test]
    fn test_no_exclusions_by_default() {
        let rewriter = LinkRewriter::new("c").with_exclusions(Vec::<String>::new()).unwrap();

        assert!(!rewriter.is_excluded("php"));
    }

    #[test]
    fn test_invalid_exclusion_pattern() {
        assert!(LinkRewriter::new("c").with_exclusions(["("]).is_err());
    }

    #[test]
    fn test_transforms_individually() {
        assert_eq!(prefix_hrefs(r#"href="a.html""#, "d/"), r#"href="d/a.html""#);
        assert_eq!(prefix_hrefs(r##"href="#x""##, "d/"), r##"href="#x""##);
        assert_eq!(
            prefix_image_sources(r#"<img src="a.png">"#, "d/"),
            r#"<img src="d/a.png">"#
        );
        assert_eq!(
            route_page_links(r#"href="d/a.html""#, "c"),
            r#"href="c?q=d/a.html""#
        );
        assert_eq!(route_page_links(r#"href="a.png""#, "c"), r#"href="a.png""#);
    }
}
