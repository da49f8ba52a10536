//! RON configuration for the frontend

use lockstep_netcode::NetplayConfig;
use lockstep_session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Tick rate, frame skip and synchronizer tuning
    pub session: SessionConfig,
    /// Network transport settings
    pub netplay: NetplayConfig,
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = ron::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, falling back to defaults when it cannot be used
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "configuration loaded");
                config
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "loading configuration failed, using defaults");
                Self::default()
            }
        }
    }

    /// Check both sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        self.netplay
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config: Config = ron::from_str(
            r#"(
                session: (input_delay: 3, tick_rate_hz: 50.0),
                netplay: (addr: "10.0.0.2:7000"),
            )"#,
        )
        .unwrap();
        assert_eq!(config.session.input_delay, 3);
        assert_eq!(config.session.max_frame_skip, 25);
        assert_eq!(config.netplay.addr.port(), 7000);
        assert_eq!(config.netplay.redundancy, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: Config = ron::from_str("()").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = Path::new("/nonexistent/lockstep.ron");
        assert!(matches!(Config::load(path), Err(ConfigError::Io(_))));
        assert_eq!(Config::load_or_default(Some(path)), Config::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let path = std::env::temp_dir().join(format!("lockstep-config-{}.ron", std::process::id()));
        fs::write(&path, "(session: (max_frame_skip: 0))").unwrap();
        let result = Config::load(&path);
        let _ = fs::remove_file(&path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
