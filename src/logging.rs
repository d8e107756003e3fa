//! Structured logging: a `tracing`/`tracing-subscriber` `EnvFilter` built
//! from `config.logging.level`, overridable by `RUST_LOG`. Distinct from
//! the job-summary output stream (plain stdout, `crate::sink`) and the
//! `[http] POST /log ...` diagnostic line (plain stderr, `crate::server`).
//! Neither of those is a `tracing` event.

use crate::config::Config;
use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber. Must be called once, before
/// any other component logs.
pub fn init(config: &Config) {
    let default_filter = format!(
        "provenance_processor={},tower_http=warn,axum=warn",
        config.logging.level
    );

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
