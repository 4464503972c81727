//! Application configuration management.
//!
//! Configuration holds the authentication API base and the timing knobs for
//! the forms. It is read once at startup and shared read-only afterwards.
//!
//! Configuration is stored at `~/.config/authforms/config.json`; the
//! `AUTHFORMS_API_BASE` and `AUTHFORMS_TOKEN_STORE` environment variables
//! override the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "authforms";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default location of the authentication router
const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/auth";

/// How long a status message stays visible
const DEFAULT_MESSAGE_DISPLAY_MS: u64 = 4000;

const ENV_API_BASE: &str = "AUTHFORMS_API_BASE";
const ENV_TOKEN_STORE: &str = "AUTHFORMS_TOKEN_STORE";

/// Where the session token is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    /// JSON key-value file in the data directory
    #[default]
    File,
    /// OS keychain
    Keyring,
}

impl TokenBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Some(TokenBackend::File),
            "keyring" => Some(TokenBackend::Keyring),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub token_store: TokenBackend,
    #[serde(default = "default_message_display_ms")]
    pub message_display_ms: u64,
    /// No timeout unless set
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_message_display_ms() -> u64 {
    DEFAULT_MESSAGE_DISPLAY_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token_store: TokenBackend::default(),
            message_display_ms: DEFAULT_MESSAGE_DISPLAY_MS,
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults if absent) and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(ENV_API_BASE).filter(|v| !v.trim().is_empty()) {
            self.api_base = base.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TOKEN_STORE) {
            match TokenBackend::parse(&raw) {
                Some(backend) => self.token_store = backend,
                None => warn!(value = %raw, "Unknown token store, keeping {:?}", self.token_store),
            }
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the durable token file
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Directory for log files. Needs no loaded config so logging can start
    /// before the config is read.
    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn message_display(&self) -> Duration {
        Duration::from_millis(self.message_display_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
