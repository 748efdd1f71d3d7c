//! HTTP endpoint server using Axum
//!
//! Serves the dashboard's `/api/stocks` route. The upstream key is held here
//! and never leaves the server.

use crate::config::Config;
use crate::quote::{parse_symbol_list, ApiKey, Cancellation, FetchError, QuoteFetcher};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, Level};

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<QuoteFetcher>,
    pub api_key: ApiKey,
    /// Held for the whole batch; one batch talks to the upstream at a time
    pub upstream_lock: Arc<Mutex<()>>,
    pub request_timeout: Duration,
    pub start_time: Arc<Instant>,
}

impl AppState {
    pub fn new(fetcher: QuoteFetcher, api_key: ApiKey, request_timeout: Duration) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            api_key,
            upstream_lock: Arc::new(Mutex::new(())),
            request_timeout,
            start_time: Arc::new(Instant::now()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuotesQuery {
    symbols: Option<String>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "service": "market-quotes",
        "provider_configured": state.api_key.is_configured(),
    }))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// `GET /api/stocks?symbols=RELIANCE,TCS`
async fn get_quotes(State(state): State<AppState>, Query(params): Query<QuotesQuery>) -> Response {
    let symbols = parse_symbol_list(params.symbols.as_deref().unwrap_or_default());
    if symbols.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "symbols query parameter is required, e.g. ?symbols=RELIANCE,TCS",
        );
    }

    // Reject a bad credential before queueing behind another batch
    if let Err(e) = state.api_key.validate() {
        return configuration_error(e);
    }

    // Deadline covers waiting for the lock as well as the batch itself
    let cancel = Cancellation::new();
    let deadline = {
        let cancel = cancel.clone();
        let timeout = state.request_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            cancel.cancel();
        })
    };

    let result = {
        let _guard = state.upstream_lock.lock().await;
        state
            .fetcher
            .fetch_quotes(&symbols, &state.api_key, &cancel)
            .await
    };
    deadline.abort();

    match result {
        Ok(batch) => {
            info!(
                symbols = batch.len(),
                ok = batch.ok_count(),
                failed = batch.err_count(),
                "Served quote batch"
            );
            Json(batch).into_response()
        }
        Err(e) => configuration_error(e),
    }
}

fn configuration_error(e: FetchError) -> Response {
    let FetchError::Configuration(reason) = e;
    error!(reason = %reason, "Quote provider is not configured");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "quote provider is not configured",
    )
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/stocks", get(get_quotes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let fetcher = QuoteFetcher::from_config(config)?;
    let api_key = config.provider.api_key();
    if !api_key.is_configured() {
        tracing::warn!(
            env = %config.provider.api_key_env,
            "API key missing or placeholder; /api/stocks will return errors"
        );
    }

    let state = AppState::new(
        fetcher,
        api_key,
        Duration::from_secs(config.server.request_timeout_secs),
    );
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(addr = %addr, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down HTTP server...");
}
