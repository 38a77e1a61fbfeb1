use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub effects: EffectsConfig,
}

/// Remote services used by the recipe and auth effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Realtime-database base URL; recipes live at `{recipes_url}/recipes.json`.
    pub recipes_url: String,
    /// Identity service base URL (e.g., "https://identitytoolkit.googleapis.com/v1").
    pub auth_url: String,
    /// Web API key sent as the `key` query parameter.
    /// Overridden by `STATEHOUSE_API_KEY`.
    pub api_key: String,
}

/// Files the CLI persists between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Signed-in user session.
    pub session_path: PathBuf,
    /// JSON snapshot of the state tree.
    pub state_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Per-run timeout for effects and HTTP requests, in seconds.
    pub timeout_seconds: u64,
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("statehouse")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            recipes_url: "http://127.0.0.1:9000".to_string(),
            auth_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            api_key: String::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let dir = data_dir();
        Self {
            session_path: dir.join("session.json"),
            state_path: dir.join("state.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self { timeout_seconds: 30 }
    }
}
