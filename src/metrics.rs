use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const SCORES_TOTAL: &str = "confluence_scores_total";
pub const INPUTS_CLAMPED_TOTAL: &str = "confluence_inputs_clamped_total";
pub const INPUTS_REJECTED_TOTAL: &str = "confluence_inputs_rejected_total";
pub const WEIGHTS_CLAMPED_TOTAL: &str = "confluence_weights_clamped_total";
pub const SCORING_ERRORS_TOTAL: &str = "confluence_scoring_errors_total";
pub const QUALITY_IMPACT: &str = "confluence_quality_impact";

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(SCORES_TOTAL, "Scoring calls that produced a result, by adjustment.");
        describe_counter!(
            INPUTS_CLAMPED_TOTAL,
            "Component scores outside [0,100] clamped before normalization."
        );
        describe_counter!(
            INPUTS_REJECTED_TOTAL,
            "Non-finite component scores excluded from aggregation."
        );
        describe_counter!(
            WEIGHTS_CLAMPED_TOTAL,
            "Negative or non-finite configured weights treated as zero."
        );
        describe_counter!(SCORING_ERRORS_TOTAL, "Scoring calls that failed validation.");
        describe_histogram!(
            QUALITY_IMPACT,
            "Signed difference between adjusted and base score."
        );
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Only one recorder may exist per process.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
