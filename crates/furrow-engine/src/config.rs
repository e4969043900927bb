//! Configuration for the furrow engine.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! gives the stock behavior: a 1 second simulated reply and a single
//! outstanding request at a time.

use crate::conversation::GREETING;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Main configuration for furrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Delay before the simulated assistant replies, in milliseconds.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,

    /// Upper bound on reply production, in seconds.
    #[serde(default = "default_reply_timeout_secs")]
    pub reply_timeout_secs: u64,

    /// What to do with submissions made while a reply is pending.
    #[serde(default)]
    pub concurrency: ConcurrencyPolicy,

    /// Assistant message every conversation starts with.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// TUI tick rate in milliseconds.
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

fn default_reply_delay_ms() -> u64 {
    1000
}

fn default_reply_timeout_secs() -> u64 {
    30
}

fn default_greeting() -> String {
    GREETING.into()
}

fn default_tick_rate_ms() -> u64 {
    250
}

/// Policy for submissions made while a reply is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyPolicy {
    /// Refuse the submission; the input keeps its text.
    #[default]
    Reject,
    /// Append the message now, produce its reply after earlier ones.
    Queue,
    /// Append the message now and produce its reply immediately.
    Parallel,
}

impl fmt::Display for ConcurrencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Queue => write!(f, "queue"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Simulated reply delay.
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    /// Reply timeout.
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            reply_timeout_secs: default_reply_timeout_secs(),
            concurrency: ConcurrencyPolicy::default(),
            greeting: default_greeting(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.reply_delay(), Duration::from_millis(1000));
        assert_eq!(config.concurrency, ConcurrencyPolicy::Reject);
        assert_eq!(config.greeting, GREETING);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config: Config =
            serde_json::from_str(r#"{"reply_delay_ms": 50, "concurrency": "queue"}"#).unwrap();
        assert_eq!(config.reply_delay_ms, 50);
        assert_eq!(config.concurrency, ConcurrencyPolicy::Queue);
        assert_eq!(config.reply_timeout_secs, 30);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            concurrency: ConcurrencyPolicy::Parallel,
            tick_rate_ms: 100,
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(&dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(Config::load(&bad), Err(ConfigError::Parse(_))));
    }
}
