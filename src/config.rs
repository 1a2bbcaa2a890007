//! Client configuration
//!
//! Loaded from `<config dir>/horizon/config.toml` when present. Every field
//! has a default, so a missing or partial file is fine.

use crate::error::{HorizonError, Result};
use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Directory name under the platform config dir
pub const APP_DIR: &str = "horizon";

/// Environment variable overriding the API base URL
pub const ENV_API_URL: &str = "HORIZON_API_URL";
/// Environment variable overriding the starting language
pub const ENV_LANGUAGE: &str = "HORIZON_LANGUAGE";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonConfig {
    /// Base URL of the assistant API, without trailing slash
    pub api_base_url: String,
    /// Upper bound for any single HTTP request
    pub request_timeout_ms: u64,
    /// How long the connectivity banner stays up
    pub banner_duration_ms: u64,
    /// Language used until the user or the server picks another
    pub default_language: Language,
    /// Channel buffer size between UI and orchestrator
    pub channel_buffer_size: usize,
    /// Shutdown timeout in milliseconds
    pub shutdown_timeout_ms: u64,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_ms: 30_000,
            banner_duration_ms: 5_000,
            default_language: Language::English,
            channel_buffer_size: 100,
            shutdown_timeout_ms: 2_000,
            window_width: 480.0,
            window_height: 760.0,
        }
    }
}

impl HorizonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config = match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };
        Ok(config.with_env_overrides())
    }

    /// Load a configuration from a TOML file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            HorizonError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| HorizonError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: HorizonConfig =
            toml::from_str(content).map_err(|e| HorizonError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(HorizonError::ConfigError(format!(
                "api_base_url must be an http(s) URL, got `{}`",
                self.api_base_url
            )));
        }
        if self.channel_buffer_size == 0 {
            return Err(HorizonError::ConfigError(
                "channel_buffer_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply `HORIZON_API_URL` and `HORIZON_LANGUAGE` if set
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(ENV_API_URL).ok(),
            std::env::var(ENV_LANGUAGE).ok(),
        )
    }

    fn with_overrides(mut self, api_url: Option<String>, language: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self = self.with_api_base_url(url);
        }
        if let Some(tag) = language {
            match tag.parse() {
                Ok(lang) => self.default_language = lang,
                Err(e) => warn!("Ignoring {}: {}", ENV_LANGUAGE, e),
            }
        }
        self
    }

    /// Set the API base URL
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout_ms(mut self, timeout: u64) -> Self {
        self.request_timeout_ms = timeout;
        self
    }

    /// Set how long the connectivity banner stays visible
    pub fn with_banner_duration_ms(mut self, duration: u64) -> Self {
        self.banner_duration_ms = duration;
        self
    }

    pub fn with_default_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    /// Set the channel buffer size
    pub fn with_channel_buffer_size(mut self, size: usize) -> Self {
        self.channel_buffer_size = size;
        self
    }

    /// Set the shutdown timeout
    pub fn with_shutdown_timeout_ms(mut self, timeout: u64) -> Self {
        self.shutdown_timeout_ms = timeout;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn banner_duration(&self) -> Duration {
        Duration::from_millis(self.banner_duration_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HorizonConfig::default();
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.banner_duration(), Duration::from_secs(5));
        assert_eq!(config.default_language, Language::English);
    }

    #[test]
    fn test_partial_toml() {
        let config = HorizonConfig::from_toml(
            r#"
            api_base_url = "https://agri.example.org"
            default_language = "ta"
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://agri.example.org");
        assert_eq!(config.default_language, Language::Tamil);
        assert_eq!(config.banner_duration_ms, 5_000);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(HorizonConfig::from_toml(r#"api_base_url = "ftp://x""#).is_err());
        assert!(HorizonConfig::from_toml(r#"default_language = "fr""#).is_err());
        assert!(HorizonConfig::from_toml("channel_buffer_size = 0").is_err());
    }

    #[test]
    fn test_overrides() {
        let config = HorizonConfig::default()
            .with_overrides(Some("http://10.0.0.2:9000/".into()), Some("mr".into()));
        assert_eq!(config.api_base_url, "http://10.0.0.2:9000");
        assert_eq!(config.default_language, Language::Marathi);

        let kept = HorizonConfig::default().with_overrides(None, Some("xx".into()));
        assert_eq!(kept.default_language, Language::English);
    }

    #[test]
    fn test_builder() {
        let config = HorizonConfig::new()
            .with_request_timeout_ms(500)
            .with_banner_duration_ms(10)
            .with_channel_buffer_size(4);
        assert_eq!(config.request_timeout(), Duration::from_millis(500));
        assert_eq!(config.banner_duration(), Duration::from_millis(10));
        assert_eq!(config.channel_buffer_size, 4);
    }
}
