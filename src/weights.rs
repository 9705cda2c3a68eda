//! # Weight Resolver
//!
//! Turns a configured `name → weight` mapping into the effective weights for
//! the components actually present in one scoring call.
//!
//! - Missing names get weight 0 (kept for display, excluded from the sum).
//! - Negative or non-finite weights are treated as 0 and logged.
//! - Each weight is scaled by the component's reliability, if the metadata
//!   table lists one.
//! - If the present weights sum to ~0, every present component gets `1/N`.
//! - A sum that overflows is rescaled by the largest weight first.
//! - Otherwise weights that do not already sum to 1 are renormalized.
//!
//! Lookups are keyed by name, so the result never depends on input order.

use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::components::ComponentTable;
use crate::error::ScoringError;
use crate::metrics::WEIGHTS_CLAMPED_TOTAL;

/// Tolerance for "sums to zero" and "already sums to one".
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Configured weights plus optional component metadata.
///
/// Loaded once per configuration change and only ever read while scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
    #[serde(default)]
    pub components: ComponentTable,
}

impl WeightConfig {
    pub fn new<K: Into<String>>(weights: impl IntoIterator<Item = (K, f64)>) -> Self {
        Self {
            weights: weights.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            components: ComponentTable::default(),
        }
    }

    pub fn with_components(mut self, components: ComponentTable) -> Self {
        self.components = components;
        self
    }

    /// Weight the resolver starts from: configured value (0 if missing or
    /// invalid) times reliability.
    fn raw_weight(&self, name: &str) -> f64 {
        let w = match self.weights.get(name) {
            None => {
                debug!(component = %name, "no configured weight, using 0");
                0.0
            }
            Some(&w) if !w.is_finite() => {
                warn!(component = %name, weight = ?w, "non-finite weight treated as 0");
                counter!(WEIGHTS_CLAMPED_TOTAL).increment(1);
                0.0
            }
            Some(&w) if w < 0.0 => {
                warn!(component = %name, weight = w, "negative weight clamped to 0");
                counter!(WEIGHTS_CLAMPED_TOTAL).increment(1);
                0.0
            }
            Some(&w) => w,
        };
        w * self.components.reliability_of(name)
    }
}

/// Effective weights for the present components; always sums to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveWeights {
    weights: BTreeMap<String, f64>,
    /// True when the equal-weight fallback was used.
    pub equal_fallback: bool,
}

impl EffectiveWeights {
    pub fn get(&self, name: &str) -> f64 {
        self.weights.get(name).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, &w)| (k.as_str(), w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// Resolve effective weights for `names` against `config`.
///
/// Fails with [`ScoringError::EmptyInput`] when `names` is empty.
pub fn resolve_weights<'a, I>(names: I, config: &WeightConfig) -> Result<EffectiveWeights, ScoringError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut weights: BTreeMap<String, f64> = names
        .into_iter()
        .map(|name| (name.to_string(), config.raw_weight(name)))
        .collect();

    if weights.is_empty() {
        return Err(ScoringError::EmptyInput);
    }

    let mut sum: f64 = weights.values().sum();

    // Finite weights can still overflow when added up.
    if !sum.is_finite() {
        let max = weights.values().copied().fold(0.0, f64::max);
        warn!(sum = ?sum, max_weight = max, "weight sum overflowed, rescaling by largest weight");
        for w in weights.values_mut() {
            *w /= max;
        }
        sum = weights.values().sum();
    }

    if sum.abs() <= WEIGHT_TOLERANCE {
        warn!(
            components = weights.len(),
            sum,
            "present weights sum to zero, using equal weights"
        );
        let equal = 1.0 / weights.len() as f64;
        for w in weights.values_mut() {
            *w = equal;
        }
        return Ok(EffectiveWeights {
            weights,
            equal_fallback: true,
        });
    }

    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        for w in weights.values_mut() {
            *w /= sum;
        }
    }

    Ok(EffectiveWeights {
        weights,
        equal_fallback: false,
    })
}
