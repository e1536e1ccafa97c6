//! Configuration file parser for ~/.config/sift/config.toml.
//!
//! The config file is optional: a missing or empty file yields
//! `Config::default()`. Unknown keys are accepted but logged, since they are
//! usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::feed::{FetchLimits, MAX_FEED_SIZE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds the maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Search configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be given.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Feed list to search (JSON, or OPML by `.opml`/`.xml` extension).
    pub feeds_file: PathBuf,

    /// Term searched for when none is given on the command line.
    pub default_term: String,

    /// Timeout for each HTTP request, headers and body, in seconds. Must be
    /// at least 1.
    pub request_timeout_secs: u64,

    /// Deadline for a whole feed search, in seconds. 0 = no deadline.
    pub feed_timeout_secs: u64,

    /// Largest feed document accepted, in bytes.
    pub max_feed_size_bytes: usize,

    /// Result channel capacity. Values below 1 are treated as 1.
    pub channel_capacity: usize,

    /// Truncate displayed content to this many columns. 0 = no limit.
    pub max_content_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feeds_file: PathBuf::from("data/feeds.json"),
            default_term: "president".to_string(),
            request_timeout_secs: 30,
            feed_timeout_secs: 0,
            max_feed_size_bytes: MAX_FEED_SIZE,
            channel_capacity: 1,
            max_content_width: 0,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "feeds_file",
        "default_term",
        "request_timeout_secs",
        "feed_timeout_secs",
        "max_feed_size_bytes",
        "channel_capacity",
        "max_content_width",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file → `Ok(Config::default())`
    /// - Invalid TOML or wrong value types → `Err(ConfigError::Parse)`
    /// - Larger than 1 MB → `Err(ConfigError::TooLarge)`
    /// - `request_timeout_secs = 0` → `Err(ConfigError::Invalid)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        if config.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        tracing::info!(path = %path.display(), feeds_file = %config.feeds_file.display(), "Loaded configuration");
        Ok(config)
    }

    /// Limits for a single feed document retrieval.
    pub fn fetch_limits(&self) -> FetchLimits {
        FetchLimits {
            timeout: Duration::from_secs(self.request_timeout_secs),
            max_size: self.max_feed_size_bytes,
        }
    }

    /// Per-feed search deadline, if one is configured.
    pub fn feed_timeout(&self) -> Option<Duration> {
        (self.feed_timeout_secs > 0).then(|| Duration::from_secs(self.feed_timeout_secs))
    }
}
