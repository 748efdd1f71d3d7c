//! market-quotes: rate-limited stock quote retrieval for the finance dashboard
//!
//! This library provides:
//! - Sequential quote fetching against a 5 calls/minute upstream
//! - Per-symbol failure isolation with partial batch results
//! - Alpha Vantage GLOBAL_QUOTE client and payload classification
//! - HTTP API for the dashboard (`/api/stocks`)
//! - Logging and Prometheus metrics

pub mod api;
pub mod cli;
pub mod config;
pub mod quote;
pub mod telemetry;
