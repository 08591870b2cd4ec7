//! CLI command implementations.

pub(crate) mod cgi;
pub(crate) mod render;

use std::path::Path;
use std::sync::Arc;

use fragdoc_config::Config;
use fragdoc_site::{
    FileAccessLog, FragmentRendererConfig, LinkRewriter, PaginatorConfig, Site, SiteConfig,
    TracingAccessLog,
};
use fragdoc_storage::{FsStorage, Storage};

pub(crate) use cgi::CgiArgs;
pub(crate) use render::RenderArgs;

use crate::error::CliError;

/// Build a [`Site`] from loaded configuration.
pub(crate) fn site_from_config(config: &Config) -> Result<Site, CliError> {
    let rewriter = LinkRewriter::new(config.site.controller.clone())
        .with_exclusions(&config.rewrite.exclude)
        .map_err(|e| CliError::Validation(format!("rewrite.exclude: {e}")))?;

    let pagination = &config.pagination;
    let site_config = SiteConfig {
        renderer: FragmentRendererConfig {
            rewriter,
            pagination: PaginatorConfig {
                window: pagination.window,
                latest_label: pagination.latest_label.clone(),
                new_badge: pagination.new_badge.clone(),
                more_label: pagination.more_label.clone(),
                back_label: pagination.back_label.clone(),
                archive_heading: pagination.archive_heading.clone(),
            },
            landing: pagination.landing.clone(),
            archive: pagination.archive.clone(),
            about: pagination.about.clone(),
            default_title: config.site.default_title.clone(),
        },
        default_target: config.site.default_target.clone(),
        not_found_message: config.site.not_found_message.clone(),
    };

    let storage: Arc<dyn Storage> = Arc::new(
        FsStorage::new(config.paths.content_dir.clone()).with_encoding(config.site.encoding()),
    );
    let site = Site::new(storage, site_config);

    Ok(match config.paths.access_log.as_deref() {
        Some(path) => with_file_access_log(site, path),
        None => site.with_access_log(TracingAccessLog),
    })
}

/// Attach a file access log, falling back to tracing when it cannot be opened.
///
/// An unwritable log never prevents a page from being served.
fn with_file_access_log(site: Site, path: &Path) -> Site {
    match FileAccessLog::open(path) {
        Ok(log) => site.with_access_log(log),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Cannot open access log, logging through tracing"
            );
            site.with_access_log(TracingAccessLog)
        }
    }
}
