//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API endpoint, the credential backend, the last used
//! email and an optional default location for new entries.
//!
//! Configuration is stored at `~/.config/headlog/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{CredentialStore, FileTokenStore, KeyringStore};
use crate::models::Location;

/// Application name used for config/data directory paths
const APP_NAME: &str = "headlog";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Production journal API
pub const DEFAULT_API_BASE_URL: &str = "https://headache-jornal.onrender.com";

/// HTTP request timeout in seconds.
/// The hosted API cold-starts slowly, 30s covers a wake-up.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding `api_base_url`
pub const API_URL_ENV: &str = "HEADLOG_API_URL";

/// Where the session token is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    Keyring,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub credential_backend: CredentialBackend,
    pub request_timeout_secs: u64,
    pub last_email: Option<String>,
    pub location: Option<Location>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            credential_backend: CredentialBackend::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_email: None,
            location: None,
        }
    }
}

impl Config {
    /// Load from the user config directory, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_base_url = url;
            }
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Open the credential store selected by `credential_backend`
    pub fn credential_store(&self) -> Result<Box<dyn CredentialStore>> {
        match self.credential_backend {
            CredentialBackend::Keyring => {
                let store = KeyringStore::new().context("Failed to open keychain entry")?;
                Ok(Box::new(store))
            }
            CredentialBackend::File => Ok(Box::new(FileTokenStore::new(self.data_dir()?))),
        }
    }
}
