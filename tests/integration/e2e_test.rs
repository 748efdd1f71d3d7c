//! End-to-end fetcher tests against a mocked upstream

use crate::support::{
    fetcher_for, global_quote, mock_quote, mock_unknown_symbols, rate_limit_note, request_count,
    TEST_KEY,
};
use market_quotes::config::Config;
use market_quotes::quote::{ApiKey, Cancellation, FetchError, QuoteError};
use rust_decimal_macros::dec;
use wiremock::MockServer;

#[tokio::test]
async fn test_mapped_and_unknown_symbols() {
    let server = MockServer::start().await;
    mock_quote(&server, "RELIANCE.BSE", global_quote("RELIANCE.BSE", "2950.45", "0.5263%")).await;
    mock_unknown_symbols(&server).await;

    let fetcher = fetcher_for(&server);
    let batch = fetcher
        .fetch_quotes(&["RELIANCE", "UNKNOWN"], &ApiKey::new(TEST_KEY), &Cancellation::new())
        .await
        .unwrap();

    let reliance = batch.get("RELIANCE").unwrap().as_ref().unwrap();
    assert_eq!(reliance.price, dec!(2950.45));
    assert_eq!(reliance.change_percent, dec!(0.5263));
    assert_eq!(batch.get("UNKNOWN"), Some(&Err(QuoteError::NoData)));
}

#[tokio::test]
async fn test_rate_limit_stops_dispatch() {
    let server = MockServer::start().await;
    mock_quote(&server, "TCS.BSE", global_quote("TCS.BSE", "3850.00", "-0.26%")).await;
    mock_quote(&server, "INFY.BSE", global_quote("INFY.BSE", "1500.10", "1.10%")).await;
    mock_quote(&server, "SBIN.BSE", rate_limit_note()).await;
    mock_quote(&server, "ITC.BSE", global_quote("ITC.BSE", "430.00", "0.10%")).await;
    mock_quote(&server, "WIPRO.BSE", global_quote("WIPRO.BSE", "480.00", "0.20%")).await;

    let fetcher = fetcher_for(&server);
    let batch = fetcher
        .fetch_quotes(
            &["TCS", "INFY", "SBIN", "ITC", "WIPRO"],
            &ApiKey::new(TEST_KEY),
            &Cancellation::new(),
        )
        .await
        .unwrap();

    assert!(batch.get("TCS").unwrap().is_ok());
    assert!(batch.get("INFY").unwrap().is_ok());
    for symbol in ["SBIN", "ITC", "WIPRO"] {
        assert_eq!(batch.get(symbol), Some(&Err(QuoteError::RateLimited)));
    }
    assert_eq!(request_count(&server, "ITC.BSE").await, 0);
    assert_eq!(request_count(&server, "WIPRO.BSE").await, 0);
}

#[tokio::test]
async fn test_placeholder_key_makes_no_requests() {
    let server = MockServer::start().await;
    mock_unknown_symbols(&server).await;

    let fetcher = fetcher_for(&server);
    let result = fetcher
        .fetch_quotes(&["TCS"], &ApiKey::new("demo"), &Cancellation::new())
        .await;

    assert!(matches!(result, Err(FetchError::Configuration(_))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[test]
fn test_config_example_parses() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.fetcher.request_delay_secs, 13);
    assert_eq!(config.symbol_map().resolve("RELIANCE"), "RELIANCE.BSE");
}
