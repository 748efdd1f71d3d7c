//! Configuration types for market-quotes
//!
//! Every section has defaults, so an empty file (or none at all) yields a
//! working configuration. The API key itself never lives in the file; only
//! the name of the environment variable holding it.

use crate::quote::{
    AlphaVantageConfig, ApiKey, FetchSettings, RateLimitPolicy, SymbolMap, ALPHA_VANTAGE_URL,
};
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub symbols: SymbolsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Upstream quote provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the quote API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_base_url() -> String {
    ALPHA_VANTAGE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_api_key_env() -> String {
    "ALPHA_VANTAGE_API_KEY".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl ProviderConfig {
    pub fn client_config(&self) -> AlphaVantageConfig {
        AlphaVantageConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> ApiKey {
        ApiKey::from_env(&self.api_key_env)
    }
}

/// Rate-limit handling mode
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitMode {
    #[default]
    Abort,
    Cooldown,
}

/// Fetch loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Pause between upstream requests (seconds). 13s keeps under 5 calls/minute.
    #[serde(default = "default_request_delay_secs")]
    pub request_delay_secs: u64,

    /// What to do when the key is throttled
    #[serde(default)]
    pub rate_limit_policy: RateLimitMode,

    /// Cooldown before the single retry in cooldown mode (seconds)
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

fn default_request_delay_secs() -> u64 {
    13
}
fn default_cooldown_secs() -> u64 {
    60
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_delay_secs: default_request_delay_secs(),
            rate_limit_policy: RateLimitMode::Abort,
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl FetcherConfig {
    pub fn settings(&self) -> FetchSettings {
        let rate_limit_policy = match self.rate_limit_policy {
            RateLimitMode::Abort => RateLimitPolicy::Abort,
            RateLimitMode::Cooldown => RateLimitPolicy::Cooldown {
                cooldown: Duration::from_secs(self.cooldown_secs),
            },
        };
        FetchSettings {
            request_delay: Duration::from_secs(self.request_delay_secs),
            rate_limit_policy,
        }
    }
}

/// Symbol mapping configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolsConfig {
    /// Start from the built-in BSE table
    #[serde(default = "default_true")]
    pub use_defaults: bool,
    /// Extra or overriding entries: internal ticker -> upstream symbol
    #[serde(default)]
    pub map: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl Default for SymbolsConfig {
    fn default() -> Self {
        Self {
            use_defaults: true,
            map: BTreeMap::new(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deadline for one /api/stocks request (seconds); remaining symbols are cancelled
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; disabled when unset
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Symbol table: built-in defaults (unless disabled) overlaid with `[symbols.map]`
    pub fn symbol_map(&self) -> SymbolMap {
        let mut map = if self.symbols.use_defaults {
            SymbolMap::with_defaults()
        } else {
            SymbolMap::new()
        };
        map.extend(&self.symbols.map);
        map
    }
}
