//! Market quote retrieval
//!
//! Fetches price and percent change for a batch of tickers from a
//! rate-limited upstream (Alpha Vantage GLOBAL_QUOTE), one request at a time,
//! recording a result or an error for every symbol.

mod alpha_vantage;
mod fetcher;
mod pacing;
pub mod payload;
mod symbols;
mod types;

pub use alpha_vantage::{AlphaVantageClient, AlphaVantageConfig, ALPHA_VANTAGE_URL};
pub use fetcher::{FetchSettings, QuoteFetcher, RateLimitPolicy, DEFAULT_COOLDOWN, DEFAULT_REQUEST_DELAY};
pub use pacing::{Cancellation, Pacer, TokioPacer};
pub use symbols::{SymbolMap, DEFAULT_BSE_TICKERS};
pub use types::{
    normalize_symbol, parse_symbol_list, ApiKey, BatchResult, FetchError, Quote, QuoteError, QuoteResult,
    TransportError,
};

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Trait for upstream quote sources
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Issue one GLOBAL_QUOTE request for an upstream-qualified symbol
    ///
    /// Returns the decoded body; classification happens in the fetcher.
    async fn global_quote(&self, symbol: &str, api_key: &str) -> Result<Value, TransportError>;
}

impl QuoteFetcher {
    /// Build the production fetcher from configuration
    pub fn from_config(config: &crate::config::Config) -> anyhow::Result<Self> {
        let client = AlphaVantageClient::with_config(config.provider.client_config())?;
        Ok(Self::new(
            Arc::new(client),
            config.symbol_map(),
            config.fetcher.settings(),
        ))
    }
}
