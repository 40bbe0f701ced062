//! Application configuration management.
//!
//! Configuration is stored at `~/.config/eshop/config.json` and holds the
//! API base URL, the last used username and session tuning knobs.
//! `ESHOP_API_BASE_URL` overrides the configured base URL.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_API_BASE_URL;
use crate::auth::session::{DEFAULT_REVALIDATION_INTERVAL, DEFAULT_TOKEN_LIFETIME_HOURS};
use crate::storage::{FileBackend, KeyringBackend, StorageBackend};

/// Application name used for config/data directory paths
const APP_NAME: &str = "eshop";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
pub const BASE_URL_ENV: &str = "ESHOP_API_BASE_URL";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurableBackendKind {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_username: Option<String>,
    pub token_lifetime_hours: Option<i64>,
    pub revalidation_interval_secs: Option<u64>,
    pub durable_backend: DurableBackendKind,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
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

    /// Base URL from the environment, then the config file, then the default
    pub fn base_url(&self) -> String {
        self.resolve_base_url(std::env::var(BASE_URL_ENV).ok())
    }

    fn resolve_base_url(&self, env_value: Option<String>) -> String {
        env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    /// Lifetime for new credentials; zero or negative means no expiry
    pub fn token_lifetime(&self) -> Option<chrono::Duration> {
        let hours = self.token_lifetime_hours.unwrap_or(DEFAULT_TOKEN_LIFETIME_HOURS);
        (hours > 0).then(|| chrono::Duration::hours(hours))
    }

    pub fn revalidation_interval(&self) -> Duration {
        self.revalidation_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REVALIDATION_INTERVAL)
    }

    pub fn open_durable_backend(&self) -> Result<Arc<dyn StorageBackend>> {
        Ok(match self.durable_backend {
            DurableBackendKind::File => Arc::new(FileBackend::new(&self.data_dir()?)),
            DurableBackendKind::Keyring => Arc::new(KeyringBackend::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_precedence() {
        let mut config = Config::default();
        assert_eq!(config.resolve_base_url(None), DEFAULT_API_BASE_URL);

        config.api_base_url = Some("http://localhost:8080/api".into());
        assert_eq!(config.resolve_base_url(None), "http://localhost:8080/api");
        assert_eq!(config.resolve_base_url(Some("  ".into())), "http://localhost:8080/api");
        assert_eq!(
            config.resolve_base_url(Some("http://env/api".into())),
            "http://env/api"
        );
    }

    #[test]
    fn test_session_knobs() {
        let mut config = Config::default();
        assert_eq!(config.token_lifetime(), Some(chrono::Duration::hours(24)));
        assert_eq!(config.revalidation_interval(), Duration::from_secs(15));

        config.token_lifetime_hours = Some(0);
        config.revalidation_interval_secs = Some(0);
        assert_eq!(config.token_lifetime(), None);
        assert_eq!(config.revalidation_interval(), Duration::from_secs(15));
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config =
            serde_json::from_str(r#"{"last_username":"a@b.com","durable_backend":"keyring"}"#).unwrap();
        assert_eq!(config.last_username.as_deref(), Some("a@b.com"));
        assert_eq!(config.durable_backend, DurableBackendKind::Keyring);
        assert_eq!(config.api_base_url, None);
    }
}
