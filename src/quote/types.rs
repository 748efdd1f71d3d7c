//! Quote retrieval types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Credential values shipped in sample configs and docs
const PLACEHOLDER_KEYS: &[&str] = &[
    "demo",
    "changeme",
    "placeholder",
    "your_api_key",
    "your-api-key",
    "your_api_key_here",
    "<api-key>",
    "xxx",
];

/// Normalize a caller-supplied ticker: trimmed and uppercased
///
/// Returns `None` for blank input.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Split a comma-separated symbol list (`"RELIANCE, tcs"`), dropping blanks
pub fn parse_symbol_list(raw: &str) -> Vec<String> {
    raw.split(',').filter_map(normalize_symbol).collect()
}

/// A parsed quote snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Last traded price
    pub price: Decimal,
    /// Change versus previous close, in percent (e.g. 1.25 for +1.25%)
    pub change_percent: Decimal,
    /// Trading day the quote belongs to, when the upstream reports it
    pub latest_trading_day: Option<NaiveDate>,
}

/// Per-symbol failure, recorded in the batch rather than returned
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    /// Request never produced a usable response
    #[error("transport failure: {0}")]
    Transport(String),
    /// Upstream had no quote for the symbol
    #[error("no data for symbol")]
    NoData,
    /// Quote was present but could not be parsed
    #[error("invalid data format")]
    InvalidFormat,
    /// Dispatch stopped because the key was throttled
    #[error("rate limited")]
    RateLimited,
    /// Batch was cancelled before this symbol was dispatched
    #[error("cancelled")]
    Cancelled,
}

impl QuoteError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            QuoteError::Transport(_) => "transport",
            QuoteError::NoData => "no_data",
            QuoteError::InvalidFormat => "invalid_format",
            QuoteError::RateLimited => "rate_limited",
            QuoteError::Cancelled => "cancelled",
        }
    }
}

/// Outcome for a single symbol
pub type QuoteResult = Result<Quote, QuoteError>;

/// Errors that abort a whole batch
#[derive(Debug, Error)]
pub enum FetchError {
    /// Credential missing or a known placeholder
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Errors raised by a quote provider for a single request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection, timeout or other request failure
    #[error("request failed: {0}")]
    Request(String),
    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// Response body was not valid JSON
    #[error("malformed response body: {0}")]
    Decode(String),
    /// Upstream answered with HTTP 429
    #[error("rate limited by upstream")]
    RateLimited,
}

/// Upstream API key
///
/// The value is never printed; `Debug` and `Display` are redacted.
#[derive(Clone, Default)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the key from an environment variable; unset yields an empty key
    pub fn from_env(var: &str) -> Self {
        Self(std::env::var(var).unwrap_or_default())
    }

    /// Reject empty and placeholder keys before any network call
    pub fn validate(&self) -> Result<(), FetchError> {
        let key = self.0.trim();
        if key.is_empty() {
            return Err(FetchError::Configuration(
                "missing quote provider API key".to_string(),
            ));
        }
        if PLACEHOLDER_KEYS
            .iter()
            .any(|placeholder| key.eq_ignore_ascii_case(placeholder))
        {
            return Err(FetchError::Configuration(
                "quote provider API key is a placeholder value".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.validate().is_ok()
    }

    /// Raw key for building upstream requests
    pub fn expose(&self) -> &str {
        self.0.trim()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.trim().is_empty() {
            f.write_str("<unset>")
        } else {
            f.write_str("<redacted>")
        }
    }
}

/// Ordered symbol -> result mapping for one batch
///
/// Every requested symbol appears exactly once, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    entries: Vec<(String, QuoteResult)>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Record a result; callers guarantee the symbol is not already present
    pub(crate) fn insert(&mut self, symbol: impl Into<String>, result: QuoteResult) {
        let symbol = symbol.into();
        debug_assert!(!self.contains(&symbol), "duplicate symbol {symbol}");
        self.entries.push((symbol, result));
    }

    pub fn get(&self, symbol: &str) -> Option<&QuoteResult> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, result)| result)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QuoteResult)> {
        self.entries.iter().map(|(s, r)| (s.as_str(), r))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(s, _)| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ok_count(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn err_count(&self) -> usize {
        self.len() - self.ok_count()
    }
}

/// Wire shape of a single entry: `{price, change}` or `{error}`
#[derive(Serialize)]
#[serde(untagged)]
enum QuoteView {
    Quote {
        #[serde(with = "rust_decimal::serde::float")]
        price: Decimal,
        #[serde(with = "rust_decimal::serde::float")]
        change: Decimal,
        #[serde(rename = "latestTradingDay", skip_serializing_if = "Option::is_none")]
        latest_trading_day: Option<NaiveDate>,
    },
    Error {
        error: String,
    },
}

impl From<&QuoteResult> for QuoteView {
    fn from(result: &QuoteResult) -> Self {
        match result {
            Ok(quote) => QuoteView::Quote {
                price: quote.price,
                change: quote.change_percent,
                latest_trading_day: quote.latest_trading_day,
            },
            Err(err) => QuoteView::Error {
                error: err.to_string(),
            },
        }
    }
}

impl Serialize for BatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (symbol, result) in &self.entries {
            map.serialize_entry(symbol, &QuoteView::from(result))?;
        }
        map.end()
    }
}
