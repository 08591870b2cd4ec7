//! Configuration management for fragdoc.
//!
//! Parses `fragdoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.controller`
//! - `site.default_title`
//! - `access_log.path`

mod expand;

use encoding_rs::{Encoding, UTF_8};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override fragment content directory.
    pub content_dir: Option<PathBuf>,
    /// Override front controller.
    pub controller: Option<String>,
    /// Override summary window size.
    pub window: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "fragdoc.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site configuration.
    pub site: SiteConfig,
    /// Summary and drill-down configuration.
    pub pagination: PaginationConfig,
    /// Link rewriting configuration.
    pub rewrite: RewriteConfig,
    /// Access log configuration (optional section).
    access_log: Option<AccessLogConfigRaw>,

    /// Resolved filesystem paths (set after loading).
    #[serde(skip)]
    pub paths: PathsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Content directory, relative to the config file.
    content_dir: Option<String>,
    /// Front controller that rewritten page links route through.
    pub controller: String,
    /// Target rendered when the request names none.
    pub default_target: String,
    /// Title used when a fragment has no `<h1>`/`<h2>`.
    pub default_title: String,
    /// Body emitted when the requested fragment does not exist.
    pub not_found_message: String,
    /// Character encoding label of the fragments and page shell
    /// (e.g. `"EUC-JP"`). Pages are served in the same encoding.
    pub encoding: String,
}

impl SiteConfig {
    /// Resolved character encoding. Falls back to UTF-8 for unknown labels,
    /// which [`Config::validate`] rejects.
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        Encoding::for_label(self.encoding.trim().as_bytes()).unwrap_or(UTF_8)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: None,
            controller: "index.php".to_owned(),
            default_target: "history.html".to_owned(),
            default_title: "Julius".to_owned(),
            not_found_message: "<p>The requested page does not exist.</p>".to_owned(),
            encoding: "UTF-8".to_owned(),
        }
    }
}

/// Summary and drill-down configuration.
///
/// Labels are HTML and are emitted without escaping.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Landing target: summary view with the first `<h2>` relabelled.
    pub landing: String,
    /// Archive target: summary view, archive heading in drill-down.
    pub archive: String,
    /// About fragment prepended in summary view.
    pub about: String,
    /// Number of sections shown in summary view.
    pub window: usize,
    /// Replacement text for the landing page's first `<h2>`.
    pub latest_label: String,
    /// Badge appended to the newest section heading.
    pub new_badge: String,
    /// Label of the link to the drill-down view.
    pub more_label: String,
    /// Label of the link back to the summary.
    pub back_label: String,
    /// Heading emitted before the archive's first section in drill-down.
    pub archive_heading: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            landing: "history.html".to_owned(),
            archive: "newjulius.html".to_owned(),
            about: "whatisjulius.html".to_owned(),
            window: 4,
            latest_label: "What's New?".to_owned(),
            new_badge: r##"<font color="#cc0000">New!</font>"##.to_owned(),
            more_label: "-&gt; Past entries".to_owned(),
            back_label: "&lt;- Back".to_owned(),
            archive_heading: "Archive".to_owned(),
        }
    }
}

/// Link rewriting configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Lines matching any of these case-insensitive regexes are not rewritten.
    pub exclude: Vec<String>,
}

/// Raw access log configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AccessLogConfigRaw {
    path: Option<String>,
}

/// Resolved filesystem paths.
#[derive(Debug, Default)]
pub struct PathsConfig {
    /// Directory fragments are read from.
    pub content_dir: PathBuf,
    /// JSON-lines access log file. `None` logs through tracing only.
    pub access_log: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.controller`").
        field: String,
        /// Error message (e.g., "${`FRAGDOC_CONTROLLER`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `fragdoc.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the result is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(content_dir) = &settings.content_dir {
            self.paths.content_dir.clone_from(content_dir);
        }
        if let Some(controller) = &settings.controller {
            self.site.controller.clone_from(controller);
        }
        if let Some(window) = settings.window {
            self.pagination.window = window;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            pagination: PaginationConfig::default(),
            rewrite: RewriteConfig::default(),
            access_log: None,
            paths: PathsConfig {
                content_dir: base.join("htdocs"),
                access_log: None,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_pagination()?;
        self.validate_rewrite()?;
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.controller, "site.controller")?;
        require_non_empty(&self.site.default_target, "site.default_target")?;
        require_non_empty(&self.site.default_title, "site.default_title")?;
        if Encoding::for_label(self.site.encoding.trim().as_bytes()).is_none() {
            return Err(ConfigError::Validation(format!(
                "site.encoding {:?} is not a known character encoding",
                self.site.encoding
            )));
        }
        Ok(())
    }

    fn validate_pagination(&self) -> Result<(), ConfigError> {
        if self.pagination.window == 0 {
            return Err(ConfigError::Validation(
                "pagination.window must be at least 1".to_owned(),
            ));
        }
        require_non_empty(&self.pagination.landing, "pagination.landing")?;
        require_non_empty(&self.pagination.archive, "pagination.archive")?;
        Ok(())
    }

    fn validate_rewrite(&self) -> Result<(), ConfigError> {
        for pattern in &self.rewrite.exclude {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(ConfigError::Validation(format!(
                    "rewrite.exclude pattern {pattern:?} is invalid: {e}"
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.controller = expand::expand_env(&self.site.controller, "site.controller")?;
        self.site.default_title =
            expand::expand_env(&self.site.default_title, "site.default_title")?;

        if let Some(ref mut access_log) = self.access_log
            && let Some(ref path) = access_log.path
        {
            access_log.path = Some(expand::expand_env(path, "access_log.path")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.paths = PathsConfig {
            content_dir: config_dir.join(self.site.content_dir.as_deref().unwrap_or("htdocs")),
            access_log: self
                .access_log
                .as_ref()
                .and_then(|log| log.path.as_deref())
                .map(|p| config_dir.join(p)),
        };
    }
}
