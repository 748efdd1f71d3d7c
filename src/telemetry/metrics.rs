//! Prometheus metrics

use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Single GLOBAL_QUOTE round trip
    UpstreamRequest,
    /// Whole batch, including pauses
    Batch,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Requests sent upstream
    UpstreamRequests,
    /// Rate-limit signals received
    RateLimited,
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::UpstreamRequest => "quotes_upstream_latency_ms",
        LatencyMetric::Batch => "quotes_batch_duration_ms",
    };

    metrics::histogram!(metric_name).record(duration.as_secs_f64() * 1000.0);
}

/// Increment a counter by one
pub fn increment_counter(metric: CounterMetric) {
    let metric_name = match metric {
        CounterMetric::UpstreamRequests => "quotes_requests_total",
        CounterMetric::RateLimited => "quotes_rate_limited_total",
    };

    metrics::counter!(metric_name).increment(1);
}

/// Count a per-symbol outcome ("ok" or an error kind)
pub fn record_outcome(outcome: &'static str) {
    metrics::counter!("quotes_results_total", "outcome" => outcome).increment(1);
}

/// Record the number of unique symbols in a batch
pub fn record_batch_size(size: usize) {
    metrics::histogram!("quotes_batch_size").record(size as f64);
}
