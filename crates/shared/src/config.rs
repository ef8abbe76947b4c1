//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// NAV provider configuration.
    #[serde(default)]
    pub nav: NavConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Configuration for the external NAV/price lookup providers.
#[derive(Debug, Clone, Deserialize)]
pub struct NavConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Pause between consecutive requests of a bulk fetch, in milliseconds.
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,
    /// Base URL of the Indian mutual fund NAV API.
    #[serde(default = "default_india_base_url")]
    pub india_base_url: String,
    /// Base URL of the UK quote API.
    #[serde(default = "default_uk_base_url")]
    pub uk_base_url: String,
}

fn default_request_timeout() -> u64 {
    10
}

fn default_request_delay() -> u64 {
    100
}

fn default_india_base_url() -> String {
    "https://api.mfapi.in".to_string()
}

fn default_uk_base_url() -> String {
    "https://www.alphavantage.co/query".to_string()
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            request_delay_ms: default_request_delay(),
            india_base_url: default_india_base_url(),
            uk_base_url: default_uk_base_url(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default`, `config/{RUN_MODE}`, then `FINTRACK__*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("FINTRACK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
