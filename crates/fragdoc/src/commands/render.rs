//! `fragdoc render` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use fragdoc_config::{CliSettings, Config};
use fragdoc_site::{RenderRequest, ViewMode};

use crate::commands::site_from_config;
use crate::error::CliError;
use crate::output::Output;
use crate::shell::{self, Shell};

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Target fragment, relative to the content directory (e.g. `history.html`).
    target: String,

    /// Render the drill-down (history) view.
    #[arg(long)]
    history: bool,

    /// Page shell with `{{title}}` and `{{content}}` placeholders.
    #[arg(long)]
    shell: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover fragdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content directory (overrides config).
    #[arg(short = 's', long)]
    content_dir: Option<PathBuf>,

    /// Front controller page links are routed through (overrides config).
    #[arg(long)]
    controller: Option<String>,

    /// Number of sections shown in summary view (overrides config).
    #[arg(long)]
    window: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Configuration overrides given on the command line.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            content_dir: self.content_dir.clone(),
            controller: self.controller.clone(),
            window: self.window,
        }
    }

    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the page cannot be rendered.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = self.cli_settings();
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let encoding = config.site.encoding();
        let shell = self
            .shell
            .as_deref()
            .map(|path| Shell::load(path, encoding))
            .transpose()?;

        if self.verbose {
            output.info(&format!(
                "Content directory: {}",
                config.paths.content_dir.display()
            ));
        }

        let site = site_from_config(&config)?;
        let mode = if self.history {
            ViewMode::History
        } else {
            ViewMode::Default
        };
        let page = site.try_render(&RenderRequest::new(self.target, mode))?;

        let html = shell::compose(shell.as_ref(), &page);
        let (body, _) = shell::encode(&html, encoding);

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&body)?;
        stdout.flush()?;
        Ok(())
    }
}
