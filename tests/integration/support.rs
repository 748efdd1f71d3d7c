//! Shared mocks for integration tests

use market_quotes::quote::{AlphaVantageClient, FetchSettings, QuoteFetcher, SymbolMap};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_KEY: &str = "INTEGRATIONKEY";

pub fn global_quote(symbol: &str, price: &str, change: &str) -> Value {
    json!({
        "Global Quote": {
            "01. symbol": symbol,
            "05. price": price,
            "07. latest trading day": "2024-06-14",
            "10. change percent": change
        }
    })
}

pub fn rate_limit_note() -> Value {
    json!({
        "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute and 500 calls per day."
    })
}

/// Answer GLOBAL_QUOTE for `symbol` with `body`
pub async fn mock_quote(server: &MockServer, symbol: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("function", "GLOBAL_QUOTE"))
        .and(query_param("symbol", symbol))
        .and(query_param("apikey", TEST_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Fallback for any other symbol: empty quote section
pub async fn mock_unknown_symbols(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Global Quote": {} })))
        .with_priority(u8::MAX)
        .mount(server)
        .await;
}

/// Fetcher against the mock server with no pacing delay
pub fn fetcher_for(server: &MockServer) -> QuoteFetcher {
    let client = AlphaVantageClient::with_client(server.uri(), reqwest::Client::new());
    let settings = FetchSettings {
        request_delay: Duration::ZERO,
        ..Default::default()
    };
    QuoteFetcher::new(Arc::new(client), SymbolMap::with_defaults(), settings)
}

/// Number of upstream requests for one upstream symbol
pub async fn request_count(server: &MockServer, symbol: &str) -> usize {
    let needle = format!("symbol={}", symbol);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|req| {
            req.url
                .query()
                .map(|q| q.split('&').any(|pair| pair == needle))
                .unwrap_or(false)
        })
        .count()
}
