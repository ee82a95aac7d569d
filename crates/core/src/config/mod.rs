//! Client configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (AIRGRID_*)
//! 2. TOML config file (if AIRGRID_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Client configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (AIRGRID_*)
/// 2. TOML config file (if AIRGRID_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key sent as the bearer token on every request.
    ///
    /// Set via AIRGRID_API_KEY environment variable. Required.
    #[serde(default)]
    pub api_key: String,

    /// Identifier of the remote base (the record collection).
    ///
    /// Set via AIRGRID_BASE environment variable. Required.
    #[serde(default)]
    pub base: String,

    /// Name of the table inside the base.
    ///
    /// Set via AIRGRID_TABLE environment variable. Required.
    #[serde(default)]
    pub table: String,

    /// Root URL of the remote API.
    ///
    /// Set via AIRGRID_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via AIRGRID_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Directory for cached JSON responses. Caching is disabled when unset.
    ///
    /// Set via AIRGRID_RESPONSE_CACHE_DIR environment variable.
    #[serde(default)]
    pub response_cache_dir: Option<PathBuf>,

    /// Directory for downloaded attachments. Disabled when unset.
    ///
    /// Set via AIRGRID_ATTACHMENT_CACHE_DIR environment variable.
    #[serde(default)]
    pub attachment_cache_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://api.airtable.com/v0".into()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base: String::new(),
            table: String::new(),
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            response_cache_dir: None,
            attachment_cache_dir: None,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `AIRGRID_`
    /// 2. TOML file from `AIRGRID_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("AIRGRID_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("AIRGRID_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
