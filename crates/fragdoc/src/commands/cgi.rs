//! `fragdoc cgi` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use fragdoc_config::Config;
use fragdoc_site::{PageStatus, RenderRequest};

use crate::commands::site_from_config;
use crate::error::CliError;
use crate::output::Output;
use crate::shell::{self, Shell};

/// Arguments for the cgi command.
#[derive(Args)]
pub(crate) struct CgiArgs {
    /// Query string of the request (e.g. `q=history.html&m=history`).
    #[arg(long, env = "QUERY_STRING", default_value = "", hide_env_values = true)]
    query: String,

    /// Page shell with `{{title}}` and `{{content}}` placeholders.
    #[arg(long)]
    shell: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover fragdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CgiArgs {
    /// Execute the cgi command.
    ///
    /// Rendering failures produce an error page with a `Status:` header;
    /// only configuration and I/O failures are returned as errors.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let encoding = config.site.encoding();
        let shell = self
            .shell
            .as_deref()
            .map(|path| Shell::load(path, encoding))
            .transpose()?;
        let site = site_from_config(&config)?;

        let request = RenderRequest::from_query(&self.query, site.default_target());
        let page = site.render(&request);
        if !page.status.is_ok() {
            Output::new().warning(&format!("{}: {}", page.target, page.status.as_str()));
        }

        let html = shell::compose(shell.as_ref(), &page);
        let (body, charset) = shell::encode(&html, encoding);

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(headers(page.status, charset.name()).as_bytes())?;
        stdout.write_all(&body)?;
        stdout.flush()?;
        Ok(())
    }
}

/// CGI response headers, including the blank separator line.
fn headers(status: PageStatus, charset: &str) -> String {
    let mut out = String::new();
    match status {
        PageStatus::Ok => {}
        PageStatus::NotFound | PageStatus::Invalid => out.push_str("Status: 404 Not Found\n"),
        PageStatus::Unavailable => out.push_str("Status: 500 Internal Server Error\n"),
    }
    out.push_str("Content-Type: text/html; charset=");
    out.push_str(charset);
    out.push_str("\n\n");
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_headers_ok() {
        assert_eq!(
            headers(PageStatus::Ok, "UTF-8"),
            "Content-Type: text/html; charset=UTF-8\n\n"
        );
    }

    #[test]
    fn test_headers_not_found_and_invalid() {
        for status in [PageStatus::NotFound, PageStatus::Invalid] {
            assert!(headers(status, "UTF-8").starts_with("Status: 404 Not Found\n"));
        }
    }

    #[test]
    fn test_headers_unavailable() {
        assert!(headers(PageStatus::Unavailable, "UTF-8").starts_with("Status: 500"));
    }

    #[test]
    fn test_headers_site_charset() {
        assert_eq!(
            headers(PageStatus::NotFound, "EUC-JP"),
            "Status: 404 Not Found\nContent-Type: text/html; charset=EUC-JP\n\n"
        );
    }
}
