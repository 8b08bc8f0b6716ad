//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::storage::RecordKeys;
use crate::storage::{DEFAULT_HISTORY_KEY, DEFAULT_SNAPSHOT_KEY};
use crate::tally::ENTRY_COUNT;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default = "default_roster")]
    pub roster: Vec<EntryConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Shared namespace configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_snapshot_key")]
    pub snapshot_key: String,

    #[serde(default = "default_history_key")]
    pub history_key: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("tally").to_string_lossy().to_string())
        .unwrap_or_else(|| "./tally_data".to_string())
}

fn default_snapshot_key() -> String {
    DEFAULT_SNAPSHOT_KEY.to_string()
}

fn default_history_key() -> String {
    DEFAULT_HISTORY_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            snapshot_key: default_snapshot_key(),
            history_key: default_history_key(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~/` expanded
    pub fn data_path(&self) -> PathBuf {
        match self.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.data_dir)),
            None => PathBuf::from(&self.data_dir),
        }
    }

    pub fn record_keys(&self) -> RecordKeys {
        RecordKeys {
            snapshot: self.snapshot_key.clone(),
            history: self.history_key.clone(),
        }
    }
}

/// Ticker display configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
}

fn default_poll_interval() -> u64 {
    4000 // 4 seconds
}

fn default_title_prefix() -> String {
    "Adventurers Trend".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            title_prefix: default_title_prefix(),
        }
    }
}

impl DisplayConfig {
    pub fn poll_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// One tracked entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntryConfig {
    /// Label on the admin form
    pub label: String,
    /// Name on the ticker card
    pub display_name: String,
}

impl EntryConfig {
    pub fn new(label: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            display_name: display_name.into(),
        }
    }
}

fn default_roster() -> Vec<EntryConfig> {
    vec![
        EntryConfig::new("John - Ozzy", "John Warlock of Oz"),
        EntryConfig::new("Kim", "Kim of House Kardar"),
        EntryConfig::new("Magus", "Magus Crumbslayer"),
        EntryConfig::new("Ye", "Ye of The West"),
        EntryConfig::new("Sharon", "Sharon"),
        EntryConfig::new("Joe", "Joe Exquisite"),
    ]
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        if config.roster.len() > ENTRY_COUNT {
            tracing::warn!(
                "Config {:?} lists {} roster entries, only the first {} are tracked",
                path,
                config.roster.len(),
                ENTRY_COUNT
            );
        }

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Standard config locations, most specific first
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("tally").join("config.toml")),
            Some(PathBuf::from("/etc/tally/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load the first existing file among `candidates`, or defaults with
    /// environment overrides when none exists.
    ///
    /// A candidate that exists but cannot be read or parsed is an error
    /// rather than being skipped.
    pub fn load_first(candidates: &[PathBuf]) -> Result<Self, ConfigError> {
        match candidates.iter().find(|path| path.exists()) {
            Some(path) => {
                let config = Self::load_with_env(path)?;
                tracing::info!("Loaded config from {:?}", path);
                Ok(config)
            }
            None => {
                tracing::debug!("Using default config with environment overrides");
                Ok(Self::from_env())
            }
        }
    }

    /// Load from default locations or environment
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_first(&Self::default_paths())
    }

    /// Load an explicit file if given, otherwise search the default locations
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_with_env(path),
            None => Self::load_default(),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(data_dir) = std::env::var("TALLY_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        if let Ok(interval) = std::env::var("TALLY_POLL_INTERVAL_MS") {
            if let Ok(ms) = interval.parse() {
                self.display.poll_interval_ms = ms;
            }
        }

        if let Ok(level) = std::env::var("TALLY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TALLY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Admin form label of entry `index` (0-based)
    pub fn entry_label(&self, index: usize) -> String {
        self.roster
            .get(index)
            .map(|e| e.label.clone())
            .unwrap_or_else(|| format!("Character {}", index + 1))
    }

    /// Ticker name of entry `index` (0-based)
    pub fn entry_display_name(&self, index: usize) -> String {
        self.roster
            .get(index)
            .map(|e| e.display_name.clone())
            .unwrap_or_else(|| format!("Character {}", index + 1))
    }

    /// Labels for all tracked entries
    pub fn labels(&self) -> Vec<String> {
        (0..ENTRY_COUNT).map(|i| self.entry_label(i)).collect()
    }

    /// Ticker names for all tracked entries
    pub fn display_names(&self) -> Vec<String> {
        (0..ENTRY_COUNT).map(|i| self.entry_display_name(i)).collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            display: DisplayConfig::default(),
            roster: default_roster(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Tally Configuration
#
# Environment variables override these settings:
# - TALLY_DATA_DIR
# - TALLY_POLL_INTERVAL_MS
# - TALLY_LOG_LEVEL
# - TALLY_LOG_FORMAT

[storage]
# Directory shared by `tally` and `tally-ticker`
data_dir = "~/.local/share/tally"

# Keys of the two records inside the data directory
snapshot_key = "rpg-tally-data"
history_key = "rpg-tally-history"

[display]
# Fallback re-render interval for the ticker (ms)
poll_interval_ms = 4000

# Prefix of the ticker title line
title_prefix = "Adventurers Trend"

# Exactly six tracked entries: form label and ticker name
[[roster]]
label = "John - Ozzy"
display_name = "John Warlock of Oz"

[[roster]]
label = "Kim"
display_name = "Kim of House Kardar"

[[roster]]
label = "Magus"
display_name = "Magus Crumbslayer"

[[roster]]
label = "Ye"
display_name = "Ye of The West"

[[roster]]
label = "Sharon"
display_name = "Sharon"

[[roster]]
label = "Joe"
display_name = "Joe Exquisite"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty or json
format = "pretty"

# Optional log file path (logs go to stderr otherwise)
# file = "/var/log/tally/tally.log"
"#
    .to_string()
}
