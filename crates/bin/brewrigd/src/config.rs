//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `brewrig.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Status recording settings.
    pub recording: RecordingConfig,
    /// Trigger polling settings.
    pub triggers: TriggersConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Integration toggles.
    pub integrations: IntegrationsConfig,
}

/// Status recorder configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Directory the per-run log trees are created under.
    pub graph_dir: String,
    /// Milliseconds between status samples.
    pub sample_interval_ms: u64,
}

/// Trigger engine configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TriggersConfig {
    /// Milliseconds between probe polls while a trigger waits.
    pub poll_interval_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Per-integration toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Enable the virtual/demo rig.
    pub virtual_enabled: bool,
}

impl Config {
    /// Load configuration from `brewrig.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails semantic validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("brewrig.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("BREWRIG_GRAPH_DIR") {
            self.recording.graph_dir = val;
        }
        if let Ok(val) = std::env::var("BREWRIG_SAMPLE_INTERVAL_MS") {
            if let Ok(millis) = val.parse() {
                self.recording.sample_interval_ms = millis;
            }
        }
        if let Ok(val) = std::env::var("BREWRIG_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.recording.sample_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "sample interval must be non-zero".to_string(),
            ));
        }
        if self.triggers.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "trigger poll interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Interval between status samples.
    #[must_use]
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.recording.sample_interval_ms)
    }

    /// Interval between trigger probe polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.triggers.poll_interval_ms)
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            graph_dir: "graph-data".to_string(),
            sample_interval_ms: 5000,
        }
    }
}

impl Default for TriggersConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "brewrigd=info,brewrig=info".to_string(),
        }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            virtual_enabled: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
