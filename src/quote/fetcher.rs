//! Sequential, rate-limited quote fetcher
//!
//! Symbols are dispatched one at a time with a fixed pause between requests.
//! Per-symbol failures are recorded in the batch; only a bad credential
//! fails the call.

use super::payload::{classify_payload, Classification};
use super::{
    normalize_symbol, ApiKey, BatchResult, Cancellation, FetchError, Pacer, QuoteError,
    QuoteProvider, QuoteResult, SymbolMap, TokioPacer, TransportError,
};
use crate::telemetry::{self, CounterMetric, LatencyMetric};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Safe spacing for the 5 calls/minute free tier
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(13);
/// Cooldown before the single retry under [`RateLimitPolicy::Cooldown`]
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// What to do when the upstream reports the key as throttled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateLimitPolicy {
    /// Mark the throttled symbol and everything after it as rate limited
    #[default]
    Abort,
    /// Wait once, retry the throttled symbol once, then abort on any further
    /// notice in the same batch
    Cooldown { cooldown: Duration },
}

/// Fetch loop tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    /// Pause between consecutive upstream requests
    pub request_delay: Duration,
    pub rate_limit_policy: RateLimitPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            request_delay: DEFAULT_REQUEST_DELAY,
            rate_limit_policy: RateLimitPolicy::Abort,
        }
    }
}

/// Position of the fetch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchState {
    /// Next symbol to dispatch
    Pending { next: usize },
    /// Request for `index` is due
    Dispatched { index: usize },
    /// Upstream throttled the request for `index`
    RateLimited { index: usize },
    Done,
}

/// Result of one upstream request
enum Attempt {
    Resolved(QuoteResult),
    Throttled,
}

/// Retrieves best-effort quotes for a batch of symbols
pub struct QuoteFetcher {
    provider: Arc<dyn QuoteProvider>,
    symbols: SymbolMap,
    pacer: Arc<dyn Pacer>,
    settings: FetchSettings,
}

impl QuoteFetcher {
    /// Create a fetcher that paces with the tokio timer
    pub fn new(provider: Arc<dyn QuoteProvider>, symbols: SymbolMap, settings: FetchSettings) -> Self {
        Self {
            provider,
            symbols,
            pacer: Arc::new(TokioPacer),
            settings,
        }
    }

    /// Replace the pacer (fake clocks in tests)
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    pub fn symbol_map(&self) -> &SymbolMap {
        &self.symbols
    }

    /// Fetch quotes for `symbols`
    ///
    /// Symbols are normalized and deduplicated (first occurrence wins). The
    /// returned batch holds exactly one entry per remaining symbol, in order.
    /// Fails only with [`FetchError::Configuration`], before any request.
    pub async fn fetch_quotes<S: AsRef<str>>(
        &self,
        symbols: &[S],
        credentials: &ApiKey,
        cancel: &Cancellation,
    ) -> Result<BatchResult, FetchError> {
        credentials.validate()?;

        let symbols = dedup_symbols(symbols);
        let batch_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("quote_batch", %batch_id, size = symbols.len());

        telemetry::record_batch_size(symbols.len());

        let batch = self
            .run(&symbols, credentials, cancel)
            .instrument(span)
            .await;

        Ok(batch)
    }

    async fn run(&self, symbols: &[String], key: &ApiKey, cancel: &Cancellation) -> BatchResult {
        let mut batch = BatchResult::with_capacity(symbols.len());
        let mut state = FetchState::Pending { next: 0 };
        // One cooldown retry per batch; any later notice aborts
        let mut cooldown_spent = false;
        let started = Instant::now();

        tracing::info!(symbols = ?symbols, "Starting quote batch");

        loop {
            state = match state {
                FetchState::Pending { next } if next >= symbols.len() => FetchState::Done,
                FetchState::Pending { next } => {
                    if cancel.is_cancelled() {
                        tracing::warn!(remaining = symbols.len() - next, "Quote batch cancelled");
                        fill_remaining(&mut batch, &symbols[next..], QuoteError::Cancelled);
                        FetchState::Done
                    } else {
                        FetchState::Dispatched { index: next }
                    }
                }
                FetchState::Dispatched { index } => {
                    let symbol = &symbols[index];
                    match self.request(symbol, key).await {
                        Attempt::Resolved(result) => {
                            record_result(&mut batch, symbol, result);
                            let next = index + 1;
                            if next < symbols.len() {
                                self.pause(self.settings.request_delay, cancel).await;
                            }
                            FetchState::Pending { next }
                        }
                        Attempt::Throttled => FetchState::RateLimited { index },
                    }
                }
                FetchState::RateLimited { index } => {
                    telemetry::increment_counter(CounterMetric::RateLimited);
                    match self.settings.rate_limit_policy {
                        RateLimitPolicy::Cooldown { cooldown } if !cooldown_spent => {
                            cooldown_spent = true;
                            tracing::warn!(
                                symbol = %symbols[index],
                                cooldown_secs = cooldown.as_secs(),
                                "Rate limited, cooling down before one retry"
                            );
                            self.pause(cooldown, cancel).await;
                            if cancel.is_cancelled() {
                                FetchState::Pending { next: index }
                            } else {
                                FetchState::Dispatched { index }
                            }
                        }
                        _ => {
                            tracing::warn!(
                                symbol = %symbols[index],
                                remaining = symbols.len() - index,
                                "Rate limited, stopping dispatch"
                            );
                            fill_remaining(&mut batch, &symbols[index..], QuoteError::RateLimited);
                            FetchState::Done
                        }
                    }
                }
                FetchState::Done => break,
            };
        }

        telemetry::record_latency(LatencyMetric::Batch, started.elapsed());
        tracing::info!(
            ok = batch.ok_count(),
            failed = batch.err_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Quote batch finished"
        );

        batch
    }

    /// Issue one request and classify the response
    async fn request(&self, symbol: &str, key: &ApiKey) -> Attempt {
        let upstream = self.symbols.resolve(symbol);
        let started = Instant::now();

        telemetry::increment_counter(CounterMetric::UpstreamRequests);
        let response = self.provider.global_quote(&upstream, key.expose()).await;
        telemetry::record_latency(LatencyMetric::UpstreamRequest, started.elapsed());

        let payload = match response {
            Ok(payload) => payload,
            Err(TransportError::RateLimited) => {
                tracing::warn!(symbol, upstream_symbol = %upstream, "Upstream returned HTTP 429");
                return Attempt::Throttled;
            }
            Err(TransportError::Decode(detail)) => {
                tracing::warn!(symbol, upstream_symbol = %upstream, error = %detail, "Malformed upstream body");
                return Attempt::Resolved(Err(QuoteError::InvalidFormat));
            }
            Err(e) => {
                tracing::warn!(symbol, upstream_symbol = %upstream, error = %e, "Quote request failed");
                return Attempt::Resolved(Err(QuoteError::Transport(e.to_string())));
            }
        };

        match classify_payload(&payload) {
            Classification::Quote(quote) => {
                tracing::debug!(symbol, price = %quote.price, change_pct = %quote.change_percent, "Quote received");
                Attempt::Resolved(Ok(quote))
            }
            Classification::RateLimited(notice) => {
                tracing::warn!(symbol, upstream_symbol = %upstream, notice = %notice, "Rate limit notice");
                Attempt::Throttled
            }
            Classification::NoData => {
                tracing::info!(symbol, upstream_symbol = %upstream, "No data for symbol");
                Attempt::Resolved(Err(QuoteError::NoData))
            }
            Classification::InvalidFormat => {
                tracing::warn!(symbol, upstream_symbol = %upstream, "Unparseable quote");
                Attempt::Resolved(Err(QuoteError::InvalidFormat))
            }
        }
    }

    /// Pause unless cancelled first
    async fn pause(&self, duration: Duration, cancel: &Cancellation) {
        if duration.is_zero() {
            return;
        }
        tokio::select! {
            _ = self.pacer.pause(duration) => {}
            _ = cancel.cancelled() => {
                tracing::debug!("Pause interrupted by cancellation");
            }
        }
    }
}

/// Normalize and deduplicate, keeping first-occurrence order
fn dedup_symbols<S: AsRef<str>>(symbols: &[S]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(symbols.len());
    for symbol in symbols.iter().filter_map(|s| normalize_symbol(s.as_ref())) {
        if !unique.contains(&symbol) {
            unique.push(symbol);
        }
    }
    unique
}

fn record_result(batch: &mut BatchResult, symbol: &str, result: QuoteResult) {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    telemetry::record_outcome(outcome);
    batch.insert(symbol, result);
}

fn fill_remaining(batch: &mut BatchResult, symbols: &[String], error: QuoteError) {
    for symbol in symbols {
        record_result(batch, symbol, Err(error.clone()));
    }
}
