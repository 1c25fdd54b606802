//! Configuration loading and validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::FetcherConfig;
use crate::parse_duration;
use crate::riot::{SeasonRules, DOUBLE_UP_QUEUE_ID, DOUBLE_UP_RANKED_QUEUE};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("{0} environment variable is not set")]
    MissingApiKey(String),
}

/// Upstream API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Wait after a 429 before retrying
    #[serde(default = "default_backoff")]
    pub rate_limit_backoff_seconds: u64,

    /// First day of the current set
    #[serde(default = "default_season_start")]
    pub season_start: NaiveDate,

    #[serde(default = "default_queue_id")]
    pub target_queue_id: u32,

    #[serde(default = "default_ranked_queue_type")]
    pub ranked_queue_type: String,

    #[serde(default = "default_match_count")]
    pub match_count: u32,
}

fn default_api_key_env() -> String {
    "RIOT_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_backoff() -> u64 {
    5
}

fn default_season_start() -> NaiveDate {
    SeasonRules::default().season_start
}

fn default_queue_id() -> u32 {
    DOUBLE_UP_QUEUE_ID
}

fn default_ranked_queue_type() -> String {
    DOUBLE_UP_RANKED_QUEUE.to_string()
}

fn default_match_count() -> u32 {
    9999
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            timeout_seconds: default_timeout(),
            rate_limit_backoff_seconds: default_backoff(),
            season_start: default_season_start(),
            target_queue_id: default_queue_id(),
            ranked_queue_type: default_ranked_queue_type(),
            match_count: default_match_count(),
        }
    }
}

impl ApiConfig {
    pub fn season_rules(&self) -> SeasonRules {
        SeasonRules {
            season_start: self.season_start,
            queue_id: self.target_queue_id,
            ranked_queue_type: self.ranked_queue_type.clone(),
            match_count: self.match_count,
        }
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            timeout: Duration::from_secs(self.timeout_seconds),
            rate_limit_backoff: Duration::from_secs(self.rate_limit_backoff_seconds),
            ..FetcherConfig::default()
        }
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(self.api_key_env.clone()))
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Quiet period after each update (e.g. "2m")
    #[serde(default = "default_cooldown")]
    pub cooldown: String,

    /// Deadline for a whole update run
    #[serde(default = "default_update_deadline")]
    pub update_deadline: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_cooldown() -> String {
    "2m".to_string()
}

fn default_update_deadline() -> String {
    "15m".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cooldown: default_cooldown(),
            update_deadline: default_update_deadline(),
        }
    }
}

impl ServerConfig {
    pub fn cooldown(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.cooldown).ok_or_else(|| {
            ConfigError::ValidationError(format!("Invalid cooldown: {}", self.cooldown))
        })
    }

    pub fn update_deadline(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.update_deadline).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "Invalid update deadline: {}",
                self.update_deadline
            ))
        })
    }
}

/// Snapshot cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("./stats_cache.json")
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.api.match_count == 0 {
            return Err(ConfigError::ValidationError(
                "Match count must be greater than 0".to_string(),
            ));
        }

        self.server.cooldown()?;
        self.server.update_deadline()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.api.api_key_env, "RIOT_API_KEY");
        assert_eq!(config.api.rate_limit_backoff_seconds, 5);
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.cache.path, PathBuf::from("./stats_cache.json"));
    }

    #[test]
    fn test_season_rules_from_config() {
        let rules = ApiConfig::default().season_rules();
        assert_eq!(rules, SeasonRules::default());
    }

    #[test]
    fn test_fetcher_config_from_config() {
        let mut api = ApiConfig::default();
        api.rate_limit_backoff_seconds = 1;
        let fetcher = api.fetcher_config();
        assert_eq!(fetcher.rate_limit_backoff, Duration::from_secs(1));
        assert_eq!(fetcher.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.cooldown().unwrap(), Duration::from_secs(120));
        assert_eq!(
            config.server.update_deadline().unwrap(),
            Duration::from_secs(900)
        );
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.api.timeout_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_cooldown() {
        let mut config = AppConfig::default();
        config.server.cooldown = "soon".to_string();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [api]
            season_start = "2025-04-01"

            [server]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(
            config.api.season_start,
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
        );
        assert_eq!(config.api.target_queue_id, 1160);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.cooldown, "2m");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.cache.path, parsed.cache.path);
        assert_eq!(config.api.season_start, parsed.api.season_start);
    }

    #[test]
    fn test_missing_api_key() {
        let mut api = ApiConfig::default();
        api.api_key_env = "DUO_TRACKER_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        assert!(matches!(api.api_key(), Err(ConfigError::MissingApiKey(_))));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.server.port, 5001);
    }
}
