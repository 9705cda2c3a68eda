//! Confluence Scoring Service: Binary Entrypoint
//! Boots the Axum HTTP server around the scoring engine: config loading,
//! tracing, Prometheus metrics and routes.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON when `CONFLUENCE_LOG_JSON=1`.
/// `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("confluence_engine=info,warn"));

    let json = std::env::var("CONFLUENCE_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    // Shuttle may already have installed a subscriber; that is fine.
    let _ = if json {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let router = confluence_engine::app()?;
    tracing::info!("confluence engine ready");

    Ok(router.into())
}
