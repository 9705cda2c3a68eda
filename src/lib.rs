// src/lib.rs
// Public library surface for the service binary and integration tests.

// Scoring core (pure, synchronous)
pub mod adjust;
pub mod aggregate;
pub mod components;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod quality;
pub mod result;
pub mod weights;

// Configuration and caller-side helpers
pub mod cache;
pub mod config;
pub mod history;
pub mod verdict;

// Service surface
pub mod api;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::adjust::{AdjustmentMode, AdjustmentType, HybridParams};
pub use crate::api::router;
pub use crate::components::{ComponentKind, ComponentMeta, ComponentTable};
pub use crate::config::EngineConfig;
pub use crate::engine::{score, ConfluenceEngine};
pub use crate::error::ScoringError;
pub use crate::normalize::ComponentScores;
pub use crate::quality::QualityMetrics;
pub use crate::result::{ComponentBreakdown, ConfluenceResult};
pub use crate::verdict::{SignalThresholds, Verdict};
pub use crate::weights::WeightConfig;

/// Build the full service router (API + `/metrics`) from env-resolved config.
/// Installs the Prometheus recorder, so call it once per process.
pub fn app() -> anyhow::Result<axum::Router> {
    let state = api::AppState::from_env()?;
    let metrics = metrics::Metrics::init()?;
    Ok(api::router(state).merge(metrics.router()))
}
