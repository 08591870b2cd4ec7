//! Shared utility functions for fragment rendering.

/// Escape text for use inside HTML element content or a double-quoted attribute.
///
/// # Examples
///
/// ```
/// use fragdoc_renderer::escape_html;
///
/// assert_eq!(escape_html(r#"a&b "c" <d>"#), "a&amp;b &quot;c&quot; &lt;d&gt;");
/// ```
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
