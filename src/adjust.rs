//! # Quality Adjustor
//!
//! Maps the aggregate signal to a 0–100 base score and then moves it toward
//! or away from neutral according to signal quality.
//!
//! Both directions share one formula: `deviation = base - 50` carries the
//! sign, so a bearish score is dampened upward and amplified downward with no
//! direction-specific branch.
//!
//! Modes:
//! - [`AdjustmentMode::DampenOnly`]: `50 + deviation · confidence`. Never
//!   moves a score further from neutral than its base.
//! - [`AdjustmentMode::Hybrid`]: amplifies when both confidence and consensus
//!   strictly exceed their thresholds, otherwise dampens exactly as above.

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::normalize::{NEUTRAL, SCORE_MAX, SCORE_MIN};
use crate::quality::QualityMetrics;

/// Caller-supplied gate and ceiling for hybrid adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridParams {
    /// Confidence must be strictly above this to amplify. In `[0, 1)`.
    pub confidence_threshold: f64,
    /// Consensus must be strictly above this to amplify. In `[0, 1]`.
    pub consensus_threshold: f64,
    /// Extra deviation granted at confidence 1.0 (0.15 = +15%).
    pub max_amplification: f64,
}

impl HybridParams {
    pub fn new(confidence_threshold: f64, consensus_threshold: f64, max_amplification: f64) -> Self {
        Self {
            confidence_threshold,
            consensus_threshold,
            max_amplification,
        }
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        let ct = self.confidence_threshold;
        if !ct.is_finite() || !(0.0..1.0).contains(&ct) {
            return Err(ScoringError::invalid(
                "confidence_threshold",
                format!("must be in [0, 1), got {ct}"),
            ));
        }
        let kt = self.consensus_threshold;
        if !kt.is_finite() || !(0.0..=1.0).contains(&kt) {
            return Err(ScoringError::invalid(
                "consensus_threshold",
                format!("must be in [0, 1], got {kt}"),
            ));
        }
        let ma = self.max_amplification;
        if !ma.is_finite() || ma < 0.0 {
            return Err(ScoringError::invalid(
                "max_amplification",
                format!("must be finite and >= 0, got {ma}"),
            ));
        }
        Ok(())
    }

    /// Both comparisons are strict: sitting exactly on a threshold dampens.
    pub fn gate_open(&self, quality: &QualityMetrics) -> bool {
        quality.confidence > self.confidence_threshold
            && quality.consensus > self.consensus_threshold
    }

    /// `1 + excess · max_amplification / (1 - confidence_threshold)`.
    fn amplification_factor(&self, confidence: f64) -> f64 {
        let excess = confidence - self.confidence_threshold;
        1.0 + excess * self.max_amplification / (1.0 - self.confidence_threshold)
    }
}

/// Closed set of adjustment strategies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AdjustmentMode {
    #[default]
    DampenOnly,
    Hybrid(HybridParams),
}

impl AdjustmentMode {
    pub fn label(&self) -> &'static str {
        match self {
            AdjustmentMode::DampenOnly => "dampen_only",
            AdjustmentMode::Hybrid(_) => "hybrid",
        }
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        match self {
            AdjustmentMode::DampenOnly => Ok(()),
            AdjustmentMode::Hybrid(p) => p.validate(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    Dampened,
    Amplified,
    Unchanged,
}

impl AdjustmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::Dampened => "dampened",
            AdjustmentType::Amplified => "amplified",
            AdjustmentType::Unchanged => "unchanged",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub base_score: f64,
    pub adjusted_score: f64,
    /// `adjusted_score - base_score`. Negative means "moved toward 0", so for a
    /// bearish base it is amplification and for a bullish base suppression.
    pub quality_impact: f64,
    pub adjustment_type: AdjustmentType,
    /// Set only when the hybrid gate opened.
    pub amplification_factor: Option<f64>,
}

pub fn base_score(weighted_sum: f64) -> f64 {
    (weighted_sum * NEUTRAL + NEUTRAL).clamp(SCORE_MIN, SCORE_MAX)
}

fn dampen(base_score: f64, confidence: f64) -> (f64, AdjustmentType) {
    if confidence >= 1.0 {
        return (base_score, AdjustmentType::Unchanged);
    }
    let deviation = base_score - NEUTRAL;
    let adjusted = (NEUTRAL + deviation * confidence).clamp(SCORE_MIN, SCORE_MAX);
    (adjusted, AdjustmentType::Dampened)
}

/// Apply the quality adjustment. Total for any finite input; `mode` should
/// already have passed [`AdjustmentMode::validate`].
pub fn adjust(weighted_sum: f64, quality: &QualityMetrics, mode: &AdjustmentMode) -> Adjustment {
    let base_score = base_score(weighted_sum);
    let deviation = base_score - NEUTRAL;

    let (adjusted_score, adjustment_type, amplification_factor) = match mode {
        AdjustmentMode::Hybrid(p) if p.gate_open(quality) => {
            let factor = p.amplification_factor(quality.confidence);
            let adjusted = (NEUTRAL + deviation * factor).clamp(SCORE_MIN, SCORE_MAX);
            (adjusted, AdjustmentType::Amplified, Some(factor))
        }
        AdjustmentMode::Hybrid(_) | AdjustmentMode::DampenOnly => {
            let (adjusted, kind) = dampen(base_score, quality.confidence);
            (adjusted, kind, None)
        }
    };

    Adjustment {
        base_score,
        adjusted_score,
        quality_impact: adjusted_score - base_score,
        adjustment_type,
        amplification_factor,
    }
}
