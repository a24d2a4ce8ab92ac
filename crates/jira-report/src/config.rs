//! Configuration file loading and credential resolution.
//!
//! Settings come from TOML files and the environment. If no config file
//! exists, the system falls back to defaults; only the Jira credentials are
//! mandatory.
//!
//! ```toml
//! [jira]
//! url = "https://jira.example.com"
//! username = "me"
//! password = "secret"
//! estimate_field = "customfield_10003"
//!
//! [report]
//! max_depth = 3
//! blacklist = ["ECO-37008"]
//! ```

use crate::domain::Blacklist;
use crate::label::DEFAULT_WRAP_WORDS;
use crate::planning::{PlanningSettings, DEFAULT_TICKET_PATTERN};
use crate::source::jira::DEFAULT_ESTIMATE_FIELD;
use crate::source::JiraSettings;
use crate::traversal::{TraversalOptions, DEFAULT_MAX_DEPTH};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the Jira base URL.
pub const URL_VAR: &str = "JIRA_URL";
/// Environment variable holding the Jira user name.
pub const USERNAME_VAR: &str = "JIRA_USERNAME";
/// Environment variable holding the Jira password or API token.
pub const PASSWORD_VAR: &str = "JIRA_PASSWORD";

/// Config file looked up in the working directory when `--config` is absent.
pub const LOCAL_CONFIG_FILE: &str = "jira-report.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PAGE_SIZE: usize = 50;

/// Errors raised while assembling the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {var} (environment) or `{key}` in the [jira] config section")]
    MissingCredential {
        var: &'static str,
        key: &'static str,
    },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid ticket pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Root configuration structure of a config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Jira connection settings (optional).
    pub jira: Option<JiraSection>,
    /// Report behaviour (optional).
    pub report: Option<ReportSection>,
}

/// `[jira]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JiraSection {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Custom field holding story points (default: customfield_10003).
    pub estimate_field: Option<String>,
    /// Verify TLS certificates (default: true).
    pub verify_tls: Option<bool>,
    /// Request timeout in seconds (default: 30).
    pub timeout_secs: Option<u64>,
    /// Results per search page (default: 50).
    pub page_size: Option<usize>,
}

/// `[report]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportSection {
    /// Number of searches including the initial query (default: 3).
    pub max_depth: Option<u32>,
    /// Key substrings to exclude.
    pub blacklist: Option<Vec<String>>,
    /// Link type names to follow; empty follows all.
    pub link_types: Option<Vec<String>>,
    /// Ticket key pattern for the planning summary.
    pub ticket_pattern: Option<String>,
    /// Base URL for browse links (default: the Jira URL).
    pub browse_url: Option<String>,
    /// Summary words per label line (default: 3).
    pub wrap_words: Option<usize>,
}

impl ReportConfig {
    /// Parse a config document.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a config file.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content, path).map(Some)
    }
}

/// Credentials taken from the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl EnvOverrides {
    /// Read the `JIRA_*` variables. Empty values count as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            url: read(URL_VAR),
            username: read(USERNAME_VAR),
            password: read(PASSWORD_VAR),
        }
    }
}

// ============================================================
// Config Loader with Priority and Merging
// ============================================================

/// Builder for loading configuration from multiple sources with priority.
///
/// Priority order (highest to lowest):
/// 1. Environment (`JIRA_URL`, `JIRA_USERNAME`, `JIRA_PASSWORD`)
/// 2. Project config (`--config <PATH>` or `./jira-report.toml`)
/// 3. User config (`<config dir>/jira-report/config.toml`)
/// 4. Defaults (hardcoded)
#[derive(Debug, Default)]
pub struct ConfigLoader {
    user_config: Option<ReportConfig>,
    project_config: Option<ReportConfig>,
    env: EnvOverrides,
}

impl ConfigLoader {
    /// Create a new config loader with only defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location of the user-level config file.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("jira-report").join("config.toml"))
    }

    /// Load and add the user-level config, if present.
    pub fn with_user_config(mut self, path: &Path) -> Result<Self, ConfigError> {
        self.user_config = ReportConfig::load(path)?;
        Ok(self)
    }

    /// Load and add the project config.
    ///
    /// An explicitly requested file must exist; the implicit
    /// `./jira-report.toml` is optional.
    pub fn with_project_config(mut self, path: &Path, required: bool) -> Result<Self, ConfigError> {
        self.project_config = ReportConfig::load(path)?;
        if required && self.project_config.is_none() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(self)
    }

    pub fn with_env(mut self, env: EnvOverrides) -> Self {
        self.env = env;
        self
    }

    /// Build the effective configuration by merging all sources.
    pub fn build(self) -> EffectiveConfig {
        EffectiveConfig {
            user: self.user_config.unwrap_or_default(),
            project: self.project_config.unwrap_or_default(),
            env: self.env,
        }
    }
}

/// Merged configuration from all sources with priority resolution.
#[derive(Debug, Default)]
pub struct EffectiveConfig {
    user: ReportConfig,
    project: ReportConfig,
    env: EnvOverrides,
}

impl EffectiveConfig {
    fn jira<T>(&self, get: impl Fn(&JiraSection) -> Option<T>) -> Option<T> {
        self.project
            .jira
            .as_ref()
            .and_then(&get)
            .or_else(|| self.user.jira.as_ref().and_then(&get))
    }

    fn report<T>(&self, get: impl Fn(&ReportSection) -> Option<T>) -> Option<T> {
        self.project
            .report
            .as_ref()
            .and_then(&get)
            .or_else(|| self.user.report.as_ref().and_then(&get))
    }

    fn credential(
        &self,
        env: &Option<String>,
        var: &'static str,
        key: &'static str,
        get: impl Fn(&JiraSection) -> Option<String>,
    ) -> Result<String, ConfigError> {
        env.clone()
            .or_else(|| self.jira(get))
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingCredential { var, key })
    }

    /// Jira base URL, if configured anywhere.
    pub fn url(&self) -> Option<String> {
        self.credential(&self.env.url, URL_VAR, "url", |j| j.url.clone())
            .ok()
    }

    /// Connection settings; fails if any credential is missing.
    pub fn jira_settings(&self) -> Result<JiraSettings, ConfigError> {
        let url = self.credential(&self.env.url, URL_VAR, "url", |j| j.url.clone())?;
        let username =
            self.credential(&self.env.username, USERNAME_VAR, "username", |j| j.username.clone())?;
        let password =
            self.credential(&self.env.password, PASSWORD_VAR, "password", |j| j.password.clone())?;

        let mut settings = JiraSettings::new(url, username, password);
        settings.estimate_field = self
            .jira(|j| j.estimate_field.clone())
            .unwrap_or_else(|| DEFAULT_ESTIMATE_FIELD.to_string());
        settings.verify_tls = self.jira(|j| j.verify_tls).unwrap_or(true);
        settings.timeout =
            Duration::from_secs(self.jira(|j| j.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS));
        settings.page_size = self.jira(|j| j.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
        Ok(settings)
    }

    pub fn max_depth(&self) -> u32 {
        self.report(|r| r.max_depth).unwrap_or(DEFAULT_MAX_DEPTH)
    }

    /// Blacklist entries from both config layers.
    pub fn blacklist(&self) -> Blacklist {
        let mut blacklist = Blacklist::default();
        for layer in [&self.user, &self.project] {
            if let Some(entries) = layer.report.as_ref().and_then(|r| r.blacklist.clone()) {
                blacklist.extend(entries);
            }
        }
        blacklist
    }

    pub fn link_types(&self) -> Vec<String> {
        self.report(|r| r.link_types.clone()).unwrap_or_default()
    }

    pub fn wrap_words(&self) -> usize {
        self.report(|r| r.wrap_words).unwrap_or(DEFAULT_WRAP_WORDS)
    }

    /// Traversal options from config; CLI values are applied by the caller.
    pub fn traversal_options(&self) -> TraversalOptions {
        TraversalOptions {
            blacklist: self.blacklist(),
            max_depth: self.max_depth(),
            link_types: self.link_types(),
            wrap_words: self.wrap_words(),
        }
    }

    /// Planning summary settings. Browse links default to the Jira URL.
    pub fn planning_settings(&self) -> Result<PlanningSettings, ConfigError> {
        let pattern = self
            .report(|r| r.ticket_pattern.clone())
            .unwrap_or_else(|| DEFAULT_TICKET_PATTERN.to_string());
        let browse_url = self
            .report(|r| r.browse_url.clone())
            .or_else(|| self.url())
            .unwrap_or_default();

        PlanningSettings::new(browse_url, &pattern)
            .map_err(|source| ConfigError::InvalidPattern { pattern, source })
    }
}
