//! # Quality Metrics
//!
//! Agreement among normalized signals and strength of the aggregate:
//!
//! - `disagreement` = population variance of the signals (divide by N).
//! - `consensus`    = `exp(-2 · disagreement)`, in `(0, 1]`.
//! - `confidence`   = `|weighted_sum| · consensus`, in `[0, 1]`.
//!
//! Signals live in `[-1, 1]`, so variance is at most 1 and consensus never
//! drops below `exp(-2)`.

use serde::{Deserialize, Serialize};

/// Scale applied to disagreement before the exponential.
pub const CONSENSUS_DECAY: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub disagreement: f64,
    pub consensus: f64,
    pub confidence: f64,
}

impl QualityMetrics {
    /// Compute metrics for one scoring call. `signals` must be non-empty and
    /// finite; the engine guarantees both.
    pub fn compute(signals: &[f64], weighted_sum: f64) -> Self {
        let disagreement = population_variance(signals);
        let consensus = (-CONSENSUS_DECAY * disagreement).exp();
        let confidence = (weighted_sum.abs() * consensus).clamp(0.0, 1.0);
        Self {
            disagreement,
            consensus,
            confidence,
        }
    }
}

/// Variance over all values, dividing by N. Zero for fewer than two values.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    // Shifted by the first value so identical inputs give exactly 0.
    let shift = values[0];
    let n = values.len() as f64;
    let (sum, sum_sq) = values.iter().fold((0.0, 0.0), |(s, sq), v| {
        let d = v - shift;
        (s + d, sq + d * d)
    });
    let var = (sum_sq - sum * sum / n) / n;
    // Rounding can leave a tiny negative residue.
    var.max(0.0)
}
