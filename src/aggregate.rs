//! Weighted aggregation of normalized signals into one signed value.

use std::collections::BTreeMap;

use crate::weights::EffectiveWeights;

/// `Σ weight[name] · signal[name]`, clamped to `[-1, 1]` against
/// floating-point overshoot. Signals without a weight contribute nothing.
pub fn weighted_sum(signals: &BTreeMap<String, f64>, weights: &EffectiveWeights) -> f64 {
    let sum: f64 = signals
        .iter()
        .map(|(name, s)| weights.get(name) * s)
        .sum();
    sum.clamp(-1.0, 1.0)
}
