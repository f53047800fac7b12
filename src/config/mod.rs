//! Typed configuration from environment variables or a TOML file.
//!
//! Loads once at startup and fails fast on malformed values. Every key is
//! optional; defaults match the public card-database rate limits.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// The collection endpoint accepts at most this many identifiers per call.
pub const MAX_BATCH_SIZE: usize = 75;

pub const DEFAULT_API_URL: &str = "https://api.scryfall.com";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub user_agent: String,
    pub batch_size: usize,
    pub dispatch_stagger_ms: u64,
    pub retry_backoff_ms: u64,
    pub request_timeout_secs: u64,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            user_agent: format!("cardcat/{}", env!("CARGO_PKG_VERSION")),
            batch_size: MAX_BATCH_SIZE,
            dispatch_stagger_ms: 200,
            retry_backoff_ms: 2000,
            request_timeout_secs: 30,
            otel_endpoint: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            api_base_url: std::env::var("CARDCAT_API_URL").unwrap_or(defaults.api_base_url),
            user_agent: std::env::var("CARDCAT_USER_AGENT").unwrap_or(defaults.user_agent),
            batch_size: parsed_var("CARDCAT_BATCH_SIZE")?.unwrap_or(defaults.batch_size),
            dispatch_stagger_ms: parsed_var("CARDCAT_STAGGER_MS")?
                .unwrap_or(defaults.dispatch_stagger_ms),
            retry_backoff_ms: parsed_var("CARDCAT_RETRY_BACKOFF_MS")?
                .unwrap_or(defaults.retry_backoff_ms),
            request_timeout_secs: parsed_var("CARDCAT_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file. Missing keys take defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("bad config file {}: {e}", path.display())))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the lookup service or the planner cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(Error::Config(format!(
                "batch_size must be between 1 and {MAX_BATCH_SIZE}, got {}",
                self.batch_size
            )));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(Error::Config("api_base_url must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn dispatch_stagger(&self) -> Duration {
        Duration::from_millis(self.dispatch_stagger_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("environment variable {name} is not valid: {raw}"))),
        Err(_) => Ok(None),
    }
}
