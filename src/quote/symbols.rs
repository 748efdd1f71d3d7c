//! Internal ticker -> upstream identifier mapping

use super::normalize_symbol;
use std::collections::HashMap;

/// Tickers the dashboard tracks on the Bombay Stock Exchange
pub const DEFAULT_BSE_TICKERS: &[&str] = &[
    "RELIANCE",
    "TCS",
    "INFY",
    "HDFCBANK",
    "ICICIBANK",
    "SBIN",
    "ITC",
    "WIPRO",
];

/// Injected symbol mapping table
///
/// Unknown symbols resolve to themselves, uppercased.
#[derive(Debug, Clone, Default)]
pub struct SymbolMap {
    entries: HashMap<String, String>,
}

impl SymbolMap {
    /// Create an empty map (identity for every symbol)
    pub fn new() -> Self {
        Self::default()
    }

    /// Map covering the dashboard's default BSE tickers
    pub fn with_defaults() -> Self {
        let mut map = Self::new();
        for ticker in DEFAULT_BSE_TICKERS {
            map.insert(*ticker, format!("{ticker}.BSE"));
        }
        map
    }

    /// Add or replace a mapping; blank keys or targets are ignored
    pub fn insert(&mut self, symbol: impl AsRef<str>, upstream: impl AsRef<str>) {
        let upstream = upstream.as_ref().trim();
        if let Some(key) = normalize_symbol(symbol.as_ref()) {
            if !upstream.is_empty() {
                self.entries.insert(key, upstream.to_string());
            }
        }
    }

    /// Resolve a ticker to the identifier sent upstream
    pub fn resolve(&self, symbol: &str) -> String {
        let key = symbol.trim().to_uppercase();
        self.entries.get(&key).cloned().unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> Extend<(K, V)> for SymbolMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (symbol, upstream) in iter {
            self.insert(symbol, upstream);
        }
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for SymbolMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}
