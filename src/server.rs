//! The HTTP receiver: a single `POST /log` route that parses a request body
//! and hands it to the processor via the shared queue. Concurrency is
//! bounded by a tower `ConcurrencyLimitLayer` rather than an OS thread pool,
//! since the underlying stack is a shared async runtime.

use crate::config::Config;
use crate::parser::{self, ParseError};
use crate::queue::RequestQueue;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;

#[derive(Clone)]
struct AppState {
    queue: Arc<RequestQueue>,
}

/// Builds the router: `POST /log`, wrapped in a concurrency-limit layer
/// bounding in-flight handler bodies to `config.worker_pool_size`.
pub fn app(config: &Config, queue: Arc<RequestQueue>) -> Router {
    Router::new()
        .route("/log", post(handle_log))
        .layer(ConcurrencyLimitLayer::new(concurrency_limit(config)))
        .with_state(AppState { queue })
}

/// The bound passed to `ConcurrencyLimitLayer`. Split out from `app` so the
/// worker-pool-size-to-concurrency-bound mapping can be asserted on
/// directly, rather than only through a timing-dependent integration test.
fn concurrency_limit(config: &Config) -> usize {
    config.worker_pool_size
}

/// Runs the server on `config.bind_addr` until `shutdown` fires, then stops
/// accepting new connections and returns once in-flight requests drain.
pub async fn serve(
    config: &Config,
    queue: Arc<RequestQueue>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> anyhow::Result<()> {
    use anyhow::Context;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .context("failed to bind HTTP listener")?;

    tracing::info!("http receiver listening on {}", config.bind_addr);

    axum::serve(listener, app(config, queue))
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await
        .context("http server error")?;

    tracing::info!("http receiver shut down");
    Ok(())
}

/// `POST /log`. Reads the raw body, logs a diagnostic line, parses it, and
/// either pushes the result onto the queue (200) or reports the parse
/// failure (400).
async fn handle_log(State(state): State<AppState>, body: Bytes) -> Response {
    eprintln!("[http] POST /log size={}", body.len());
    eprintln!("{}", String::from_utf8_lossy(&body));

    match parser::parse_request(&body) {
        Ok(request) => {
            state.queue.push(request);
            (
                StatusCode::OK,
                Json(json!({ "status": "ok" })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!("rejected malformed /log body: {e}");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "error", "message": parse_error_message(&e) })),
            )
                .into_response()
        }
    }
}

fn parse_error_message(e: &ParseError) -> String {
    e.to_string()
}
