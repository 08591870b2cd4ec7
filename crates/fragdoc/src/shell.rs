//! Page shell templating.

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::Encoding;
use fragdoc_site::RenderedPage;

use crate::error::CliError;

const TITLE_PLACEHOLDER: &str = "{{title}}";
const CONTENT_PLACEHOLDER: &str = "{{content}}";

/// HTML page shell with `{{title}}` and `{{content}}` placeholders.
pub(crate) struct Shell {
    template: String,
}

impl Shell {
    /// Load a shell template stored in `encoding` from `path`.
    pub(crate) fn load(path: &Path, encoding: &'static Encoding) -> Result<Self, CliError> {
        let bytes = std::fs::read(path)?;
        let (template, _, had_errors) = encoding.decode(&bytes);
        if had_errors {
            tracing::warn!(
                path = %path.display(),
                encoding = encoding.name(),
                "Shell contains malformed bytes"
            );
        }
        Self::from_template(template.into_owned()).map_err(|_| {
            CliError::Validation(format!(
                "{} has no {CONTENT_PLACEHOLDER} placeholder",
                path.display()
            ))
        })
    }

    fn from_template(template: String) -> Result<Self, String> {
        if template.contains(CONTENT_PLACEHOLDER) {
            Ok(Self { template })
        } else {
            Err(template)
        }
    }

    /// Insert `page` into the shell.
    ///
    /// Placeholders appearing inside the page itself are left alone.
    pub(crate) fn fill(&self, page: &RenderedPage) -> String {
        let body = page.body();
        self.template
            .split(CONTENT_PLACEHOLDER)
            .map(|part| part.replace(TITLE_PLACEHOLDER, &page.title))
            .collect::<Vec<_>>()
            .join(&body)
    }
}

/// Page without a shell: body lines followed by the title element.
pub(crate) fn bare(page: &RenderedPage) -> String {
    let mut out = String::new();
    for line in &page.lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("<title>");
    out.push_str(&page.title);
    out.push_str("</title>\n");
    out
}

/// Render `page` with the optional shell.
pub(crate) fn compose(shell: Option<&Shell>, page: &RenderedPage) -> String {
    shell.map_or_else(|| bare(page), |shell| shell.fill(page))
}

/// Encode composed output for the wire.
///
/// Characters `encoding` cannot represent become numeric character
/// references. UTF-16 labels are served as UTF-8; the returned encoding is
/// the one actually used.
pub(crate) fn encode<'a>(
    text: &'a str,
    encoding: &'static Encoding,
) -> (Cow<'a, [u8]>, &'static Encoding) {
    let (bytes, used, _) = encoding.encode(text);
    (bytes, used)
}
