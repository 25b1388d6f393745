//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the auth API base URL, the last used username, timeouts and logging.
//!
//! Configuration is stored at `~/.config/authsuite/config.json`. The
//! `AUTHSUITE_*` environment variables (also read from a `.env` file by the
//! CLI) take precedence over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::auth::DEFAULT_REFRESH_LEAD;

/// Application name used for config directory paths
const APP_NAME: &str = "authsuite";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_BASE_URL: &str = "AUTHSUITE_API_BASE_URL";
pub const ENV_USERNAME: &str = "AUTHSUITE_USERNAME";
pub const ENV_PASSWORD: &str = "AUTHSUITE_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_username: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub refresh_lead_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
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

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply `AUTHSUITE_API_BASE_URL` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = Some(url);
        }
        self
    }

    pub fn api_base_url(&self) -> Result<&str> {
        self.api_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .with_context(|| {
                format!(
                    "No auth API base URL configured; set {} or api_base_url in the config file",
                    ENV_API_BASE_URL
                )
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn refresh_lead(&self) -> Duration {
        self.refresh_lead_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REFRESH_LEAD)
    }

    /// Username to prefill: the environment first, then the last one used.
    pub fn default_username(&self) -> Option<String> {
        std::env::var(ENV_USERNAME)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.last_username.clone())
    }
}
