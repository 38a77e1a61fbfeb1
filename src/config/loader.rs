use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use reqwest::Url;
use thiserror::Error;

use crate::config::types::Config;

/// Environment variable that overrides `api.api_key`.
pub const API_KEY_ENV: &str = "STATEHOUSE_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid TOML in config '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// `<config dir>/statehouse/config.toml`, or `./statehouse/config.toml`
    /// when the platform has no config directory.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("statehouse")
            .join("config.toml")
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Read `path` (defaults when it does not exist), apply the
    /// [`API_KEY_ENV`] override and validate.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|source| ConfigError::ParseError {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file absent, using defaults");
                Config::default()
            }
            Err(source) => {
                return Err(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        config.override_api_key(std::env::var(API_KEY_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    fn override_api_key(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api.api_key = key;
        }
    }

    /// Service URLs must be absolute and the effect timeout non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError { message };

        for (field, value) in [
            ("api.recipes_url", &self.api.recipes_url),
            ("api.auth_url", &self.api.auth_url),
        ] {
            Url::parse(value)
                .map_err(|e| invalid(format!("{field} '{value}' is not a valid URL: {e}")))?;
        }
        if self.effects.timeout_seconds == 0 {
            return Err(invalid(
                "effects.timeout_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
