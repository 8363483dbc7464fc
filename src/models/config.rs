//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upstream CMS settings
    pub source: SourceConfig,

    /// Validation gate thresholds (required, institution specific)
    pub safety: SafetyConfig,

    /// Database and audit locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.source.url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "source.url must be http(s), got '{}'",
                url.scheme()
            )));
        }
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if self.source.token_env.trim().is_empty() {
            return Err(AppError::validation("source.token_env is empty"));
        }
        if !self.safety.max_change_percent.is_finite() || self.safety.max_change_percent < 0.0 {
            return Err(AppError::validation(
                "safety.max_change_percent must be a non-negative number",
            ));
        }
        Ok(())
    }
}

/// Upstream CMS API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Faculty profile endpoint
    pub url: String,

    /// Environment variable holding the bearer token
    #[serde(default = "defaults::token_env")]
    pub token_env: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl SourceConfig {
    /// Read the bearer token from the environment (after loading `.env`).
    pub fn token(&self) -> Result<String> {
        dotenvy::dotenv().ok();
        std::env::var(&self.token_env)
            .map_err(|_| AppError::config(format!("{} is not set", self.token_env)))
    }
}

/// Validation gate thresholds.
///
/// Both values depend on the institution's roster size, so there are no
/// built-in defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SafetyConfig {
    /// Fewest records an upstream response may contain
    pub min_roster_size: usize,

    /// Largest allowed roster size change, in percent of the previous size
    pub max_change_percent: f64,
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// SQLite database holding the roster and change logs
    #[serde(default = "defaults::database")]
    pub database: PathBuf,

    /// Directory for per-run audit files
    #[serde(default = "defaults::audit_dir")]
    pub audit_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            database: defaults::database(),
            audit_dir: defaults::audit_dir(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn token_env() -> String {
        "FACULTY_TOKEN".into()
    }
    pub fn user_agent() -> String {
        concat!("faculty-sync/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn database() -> PathBuf {
        PathBuf::from("data/faculty.sqlite")
    }
    pub fn audit_dir() -> PathBuf {
        PathBuf::from("data/change_logs")
    }
    pub fn level() -> String {
        "info".into()
    }
}
