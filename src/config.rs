use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

const APP_DIR: &str = "todo-live";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_id: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Artificial delay applied to every gateway mutation, in milliseconds.
    #[serde(default)]
    pub latency_ms: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            login_id: None,
            log_level: default_log_level(),
            latency_ms: 0,
        }
    }
}

/// Keys accepted by `config get` / `config set`.
pub const KEYS: [&str; 3] = ["login_id", "log_level", "latency_ms"];

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = get_config_file_path()?;

        if !config_path.exists() {
            return Err(ConfigError::ConfigNotFound);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Self::parse(&content)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::load() {
            Err(ConfigError::ConfigNotFound) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = get_config_file_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let content =
            toml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&config_path, content).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        match key {
            "login_id" => Ok(self.login_id.clone().unwrap_or_default()),
            "log_level" => Ok(self.log_level.clone()),
            "latency_ms" => Ok(self.latency_ms.to_string()),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "login_id" => {
                self.login_id = if value.trim().is_empty() { None } else { Some(value) };
            }
            "log_level" => self.log_level = value,
            "latency_ms" => {
                self.latency_ms = value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value,
                })?;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn get_config_file_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::ConfigDirNotFound)?;

    Ok(config_dir.join(APP_DIR).join("config.toml"))
}

/// Where the log file goes; the terminal itself belongs to the UI.
pub fn log_file_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join(APP_DIR).join("todo-live.log"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Configuration not found. Run 'todo-live login <email>' or 'todo-live config set <key> <value>' to create it."
    )]
    ConfigNotFound,
    #[error("Could not find config directory")]
    ConfigDirNotFound,
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Failed to parse config file: {0}")]
    ParseError(String),
    #[error("Failed to serialize config: {0}")]
    SerializeError(String),
    #[error("Unknown configuration key '{0}'. Supported keys: login_id, log_level, latency_ms.")]
    UnknownKey(String),
    #[error("Invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },
}
