//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::is_remote;

/// Upper bound on the snapshot lifetime (one year).
const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data source locations and fetch behavior
    #[serde(default)]
    pub sources: SourceConfig,

    /// Snapshot cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.sources.primary_url.trim().is_empty() {
            return Err(AppError::validation("sources.primary_url is empty"));
        }
        if self.sources.fallback_url.trim().is_empty() {
            return Err(AppError::validation("sources.fallback_url is empty"));
        }
        for location in [&self.sources.primary_url, &self.sources.fallback_url] {
            if is_remote(location) {
                let url = url::Url::parse(location.trim())?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(AppError::validation(format!(
                        "unsupported source scheme: {location}"
                    )));
                }
            }
        }
        if self.sources.user_agent.trim().is_empty() {
            return Err(AppError::validation("sources.user_agent is empty"));
        }
        if self.sources.timeout_ms == 0 {
            return Err(AppError::validation("sources.timeout_ms must be > 0"));
        }
        if self.cache.key.trim().is_empty() {
            return Err(AppError::validation("cache.key is empty"));
        }
        if self.cache.ttl_secs == 0 {
            return Err(AppError::validation("cache.ttl_secs must be > 0"));
        }
        if self.cache.ttl_secs > MAX_TTL_SECS {
            return Err(AppError::validation(format!(
                "cache.ttl_secs must be <= {MAX_TTL_SECS}"
            )));
        }
        Ok(())
    }
}

/// What callers receive when every source fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LastResort {
    /// Loadable entries of the bundled sample posts
    #[default]
    Sample,
    /// No posts at all
    Empty,
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Published spreadsheet CSV export
    #[serde(default = "defaults::primary_url")]
    pub primary_url: String,

    /// Bundled CSV with the same schema (path or URL)
    #[serde(default = "defaults::fallback_url")]
    pub fallback_url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "defaults::timeout_ms")]
    pub timeout_ms: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Result when both sources fail
    #[serde(default)]
    pub last_resort: LastResort,
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            primary_url: defaults::primary_url(),
            fallback_url: defaults::fallback_url(),
            timeout_ms: defaults::timeout_ms(),
            user_agent: defaults::user_agent(),
            last_resort: LastResort::default(),
        }
    }
}

/// Snapshot cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding the key-value slots
    #[serde(default = "defaults::cache_dir")]
    pub dir: PathBuf,

    /// Slot name for the post snapshot
    #[serde(default = "defaults::cache_key")]
    pub key: String,

    /// Snapshot lifetime in seconds
    #[serde(default = "defaults::cache_ttl")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: defaults::cache_dir(),
            key: defaults::cache_key(),
            ttl_secs: defaults::cache_ttl(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn primary_url() -> String {
        "https://docs.google.com/spreadsheets/d/YOUR_SHEET_ID_HERE/pub?gid=0&single=true&output=csv"
            .into()
    }
    pub fn fallback_url() -> String {
        "data/fallbackPosts.csv".into()
    }
    pub fn timeout_ms() -> u64 {
        3000
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; postsheet/0.1)".into()
    }

    // Cache defaults
    pub fn cache_dir() -> PathBuf {
        PathBuf::from(".cache")
    }
    pub fn cache_key() -> String {
        "templates".into()
    }
    pub fn cache_ttl() -> u64 {
        5 * 60
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
