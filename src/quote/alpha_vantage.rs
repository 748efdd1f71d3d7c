//! Alpha Vantage API client
//!
//! Issues GLOBAL_QUOTE requests. The free tier allows 5 calls per minute per
//! key; throttling is reported in the response body, so this client only maps
//! transport-level failures and leaves body classification to the fetcher.

use super::{QuoteProvider, TransportError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Alpha Vantage base URL
pub const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co";

/// Longest error body kept in a transport error
const MAX_ERROR_BODY: usize = 200;

/// Configuration for the Alpha Vantage client
#[derive(Debug, Clone)]
pub struct AlphaVantageConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            base_url: ALPHA_VANTAGE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the Alpha Vantage query endpoint
pub struct AlphaVantageClient {
    config: AlphaVantageConfig,
    client: Client,
}

impl AlphaVantageClient {
    /// Create a client with default configuration
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(AlphaVantageConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: AlphaVantageConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { config, client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            config: AlphaVantageConfig {
                base_url: base_url.into(),
                ..Default::default()
            },
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageClient {
    async fn global_quote(&self, symbol: &str, api_key: &str) -> Result<Value, TransportError> {
        let url = self.query_url();

        tracing::debug!(url = %url, symbol, "Requesting GLOBAL_QUOTE");

        // Strip the URL from errors: it carries the API key
        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", api_key),
            ])
            .send()
            .await
            .map_err(|e| TransportError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TransportError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::Decode(e.without_url().to_string()))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
