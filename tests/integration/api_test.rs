//! HTTP API tests

use crate::support::{fetcher_for, global_quote, mock_quote, mock_unknown_symbols, TEST_KEY};
use axum_test::TestServer;
use market_quotes::api::{create_router, AppState};
use market_quotes::quote::{AlphaVantageClient, ApiKey, FetchSettings, QuoteFetcher, SymbolMap};
use serde_json::Value;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

async fn test_app(server: &MockServer, key: &str) -> TestServer {
    let state = AppState::new(fetcher_for(server), ApiKey::new(key), Duration::from_secs(30));
    TestServer::new(create_router(state)).expect("start test server")
}

#[tokio::test]
async fn test_health_endpoint() {
    let upstream = MockServer::start().await;
    let app = test_app(&upstream, TEST_KEY).await;

    let response = app.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "market-quotes");
    assert_eq!(body["provider_configured"], true);
    assert!(body["uptime_seconds"].as_u64().is_some());
}

#[tokio::test]
async fn test_stocks_endpoint_returns_batch() {
    let upstream = MockServer::start().await;
    mock_quote(&upstream, "RELIANCE.BSE", global_quote("RELIANCE.BSE", "2950.50", "0.52%")).await;
    mock_quote(&upstream, "TCS.BSE", global_quote("TCS.BSE", "3850.00", "-0.26%")).await;
    mock_unknown_symbols(&upstream).await;
    let app = test_app(&upstream, TEST_KEY).await;

    let response = app
        .get("/api/stocks")
        .add_query_param("symbols", "reliance,TCS,UNKNOWN")
        .await;
    assert_eq!(response.status_code(), 200);

    let text = response.text();
    let reliance_pos = text.find("RELIANCE").unwrap();
    let tcs_pos = text.find("TCS").unwrap();
    let unknown_pos = text.find("UNKNOWN").unwrap();
    assert!(reliance_pos < tcs_pos && tcs_pos < unknown_pos, "keys keep request order");

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["RELIANCE"]["price"], 2950.5);
    assert_eq!(body["RELIANCE"]["change"], 0.52);
    assert_eq!(body["TCS"]["change"], -0.26);
    assert_eq!(body["UNKNOWN"]["error"], "no data for symbol");
}

#[tokio::test]
async fn test_stocks_endpoint_requires_symbols() {
    let upstream = MockServer::start().await;
    let app = test_app(&upstream, TEST_KEY).await;

    let missing = app.get("/api/stocks").await;
    assert_eq!(missing.status_code(), 400);

    let blank = app.get("/api/stocks").add_query_param("symbols", " , ").await;
    assert_eq!(blank.status_code(), 400);
    let body: Value = blank.json();
    assert!(body["error"].as_str().unwrap().contains("symbols"));
}

#[tokio::test]
async fn test_stocks_endpoint_without_key() {
    let upstream = MockServer::start().await;
    mock_unknown_symbols(&upstream).await;
    let app = test_app(&upstream, "").await;

    let response = app.get("/api/stocks").add_query_param("symbols", "TCS").await;
    assert_eq!(response.status_code(), 500);

    let body: Value = response.json();
    assert_eq!(body["error"], "quote provider is not configured");
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stocks_endpoint_deadline_cancels_remaining() {
    let upstream = MockServer::start().await;
    mock_quote(&upstream, "TCS.BSE", global_quote("TCS.BSE", "3850.00", "-0.26%")).await;
    mock_unknown_symbols(&upstream).await;

    // 1 hour between requests, 200ms deadline: only the first symbol is fetched
    let client = AlphaVantageClient::with_client(upstream.uri(), reqwest::Client::new());
    let settings = FetchSettings {
        request_delay: Duration::from_secs(3600),
        ..Default::default()
    };
    let fetcher = QuoteFetcher::new(Arc::new(client), SymbolMap::with_defaults(), settings);
    let state = AppState::new(fetcher, ApiKey::new(TEST_KEY), Duration::from_millis(200));
    let app = TestServer::new(create_router(state)).expect("start test server");

    let response = app
        .get("/api/stocks")
        .add_query_param("symbols", "TCS,INFY")
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["TCS"]["price"], 3850.0);
    assert_eq!(body["INFY"]["error"], "cancelled");
}

#[tokio::test]
async fn test_stocks_endpoint_bad_key_does_not_wait_for_running_batch() {
    let upstream = MockServer::start().await;
    let state = AppState::new(fetcher_for(&upstream), ApiKey::new("demo"), Duration::from_secs(30));
    // Another batch holds the upstream for the duration of the test
    let _running = state.upstream_lock.clone().lock_owned().await;
    let app = TestServer::new(create_router(state)).expect("start test server");

    let request = app
        .get("/api/stocks")
        .add_query_param("symbols", "TCS")
        .into_future();
    let response = tokio::time::timeout(Duration::from_secs(5), request)
        .await
        .expect("bad key is reported without waiting for the lock");

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "quote provider is not configured");
}
