//! # Confluence Engine
//! Pure, synchronous scoring: `(scores, weights, mode)` → [`ConfluenceResult`].
//! No I/O and no hidden state, so one engine can be shared across threads and
//! symbols without locking.
//!
//! Flow: validate/normalize → resolve weights → weighted sum + quality
//! metrics → quality adjustment → assemble result.

use metrics::{counter, histogram};
use tracing::{debug, warn};

use crate::adjust::{adjust, AdjustmentMode};
use crate::aggregate::weighted_sum;
use crate::config::EngineConfig;
use crate::error::ScoringError;
use crate::metrics::{ensure_described, QUALITY_IMPACT, SCORES_TOTAL, SCORING_ERRORS_TOTAL};
use crate::normalize::{validate_scores, ComponentScores};
use crate::quality::QualityMetrics;
use crate::result::{ComponentBreakdown, ConfluenceResult};
use crate::weights::{resolve_weights, WeightConfig};

/// Score one set of component values.
///
/// Errors are explicit: an empty or all-non-finite input never comes back as
/// a neutral 50.
pub fn score(
    scores: &ComponentScores,
    weights: &WeightConfig,
    mode: &AdjustmentMode,
) -> Result<ConfluenceResult, ScoringError> {
    ensure_described();
    let out = score_inner(scores, weights, mode);
    if let Err(e) = &out {
        warn!(error = %e, "scoring call failed");
        counter!(SCORING_ERRORS_TOTAL, "kind" => e.kind()).increment(1);
    }
    out
}

fn score_inner(
    scores: &ComponentScores,
    weights: &WeightConfig,
    mode: &AdjustmentMode,
) -> Result<ConfluenceResult, ScoringError> {
    if scores.is_empty() {
        return Err(ScoringError::EmptyInput);
    }
    mode.validate()?;

    // 1) Clamp out-of-range values, drop non-finite ones
    let validated = validate_scores(scores);
    if validated.is_empty() {
        return Err(ScoringError::NoFiniteInputs {
            rejected: validated.rejected,
        });
    }
    let signals = validated.signals();

    // 2) Effective weights over what survived validation
    let effective = resolve_weights(signals.keys().map(String::as_str), weights)?;

    // 3) Aggregate + quality
    let ws = weighted_sum(&signals, &effective);
    let values: Vec<f64> = signals.values().copied().collect();
    let quality = QualityMetrics::compute(&values, ws);

    // 4) Adjustment
    let adjustment = adjust(ws, &quality, mode);

    // 5) Breakdown (BTreeMap iteration keeps it ordered by name)
    let breakdown = validated
        .accepted
        .iter()
        .map(|(name, s)| {
            ComponentBreakdown::new(
                name.clone(),
                weights.components.kind_of(name),
                s.raw,
                signals[name],
                effective.get(name),
            )
            .clamped(s.clamped)
        })
        .collect::<Vec<_>>();

    counter!(SCORES_TOTAL, "adjustment" => adjustment.adjustment_type.as_str()).increment(1);
    histogram!(QUALITY_IMPACT).record(adjustment.quality_impact);
    debug!(
        components = breakdown.len(),
        rejected = validated.rejected.len(),
        equal_weights = effective.equal_fallback,
        weighted_sum = ws,
        base = adjustment.base_score,
        adjusted = adjustment.adjusted_score,
        confidence = quality.confidence,
        consensus = quality.consensus,
        adjustment = adjustment.adjustment_type.as_str(),
        "confluence scored"
    );

    Ok(ConfluenceResult::assemble(
        ws,
        quality,
        adjustment,
        mode.label(),
        breakdown,
        validated.rejected,
    ))
}

/// Engine bound to one configuration snapshot.
#[derive(Debug, Clone, Default)]
pub struct ConfluenceEngine {
    config: EngineConfig,
}

impl ConfluenceEngine {
    /// Validates the configuration up front so scoring calls only fail on input.
    pub fn new(config: EngineConfig) -> Result<Self, ScoringError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn score(&self, scores: &ComponentScores) -> Result<ConfluenceResult, ScoringError> {
        score(scores, &self.config.weighting, &self.config.adjustment)
    }

    /// Score several symbols; each entry is independent of the others.
    pub fn score_many<'a, I>(&self, items: I) -> Vec<(String, Result<ConfluenceResult, ScoringError>)>
    where
        I: IntoIterator<Item = (&'a str, &'a ComponentScores)>,
    {
        items
            .into_iter()
            .map(|(symbol, scores)| (symbol.to_string(), self.score(scores)))
            .collect()
    }
}
