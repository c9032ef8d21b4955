//! Session configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 90 minutes.
pub const DEFAULT_DURATION_SECS: u32 = 5400;
/// 5 minutes.
pub const DEFAULT_WARNING_THRESHOLD_SECS: u32 = 300;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Timing parameters for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Countdown length for one attempt.
    pub duration_secs: u32,
    /// Remaining time at or below which the low-time warning is raised.
    pub warning_threshold_secs: u32,
    /// Heartbeat cadence. One tick always counts as one second.
    pub tick_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            warning_threshold_secs: DEFAULT_WARNING_THRESHOLD_SECS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl SessionConfig {
    /// Config with the given duration and default everything else.
    pub fn with_duration(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            ..Self::default()
        }
    }

    /// Parse a TOML document.
    ///
    /// ```toml
    /// duration_secs = 1800
    /// warning_threshold_secs = 120
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_secs == 0 {
            return Err(ConfigError::Invalid("duration_secs must be greater than 0"));
        }

        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be greater than 0"));
        }

        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.duration_secs, 5400);
        assert_eq!(config.warning_threshold_secs, 300);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SessionConfig::from_toml_str("duration_secs = 600").unwrap();
        assert_eq!(config.duration_secs, 600);
        assert_eq!(config.warning_threshold_secs, 300);
    }

    #[test]
    fn test_rejects_zero_duration() {
        assert!(matches!(
            SessionConfig::from_toml_str("duration_secs = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SessionConfig::from_toml_str("duration_secs = \"long\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.toml");
        fs::write(&path, "duration_secs = 10\nwarning_threshold_secs = 3\n").unwrap();

        let config = SessionConfig::from_toml_file(&path).unwrap();
        assert_eq!(config, SessionConfig {
            duration_secs: 10,
            warning_threshold_secs: 3,
            tick_interval_ms: 1000,
        });

        let missing = SessionConfig::from_toml_file(dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
