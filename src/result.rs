//! result.rs: output record of one scoring call, including per-component
//! explainability ("why was this score 72?").
//!
//! Built fresh on every call and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::adjust::{Adjustment, AdjustmentType};
use crate::components::ComponentKind;
use crate::quality::QualityMetrics;

/// One component's share of the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentBreakdown {
    pub name: String,
    pub kind: ComponentKind,
    /// Score as supplied by the analyzer (before clamping).
    pub raw_value: f64,
    /// Signed unit signal derived from the clamped score.
    pub normalized_signal: f64,
    pub effective_weight: f64,
    /// `effective_weight · normalized_signal`.
    pub weighted_contribution: f64,
    /// True when `raw_value` was outside `[0, 100]`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub clamped: bool,
}

impl ComponentBreakdown {
    pub fn new(
        name: impl Into<String>,
        kind: ComponentKind,
        raw_value: f64,
        normalized_signal: f64,
        effective_weight: f64,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            raw_value,
            normalized_signal,
            effective_weight,
            weighted_contribution: effective_weight * normalized_signal,
            clamped: false,
        }
    }

    pub fn clamped(mut self, clamped: bool) -> Self {
        self.clamped = clamped;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceResult {
    pub base_score: f64,
    pub adjusted_score: f64,
    pub consensus: f64,
    pub confidence: f64,
    pub disagreement: f64,
    /// `adjusted_score - base_score`; its "good" sign depends on direction.
    pub quality_impact: f64,
    pub adjustment_type: AdjustmentType,
    pub weighted_sum: f64,
    /// Label of the adjustment mode that produced this result.
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplification_factor: Option<f64>,
    /// Ordered by component name.
    pub breakdown: Vec<ComponentBreakdown>,
    /// Components excluded because their score was NaN or infinite.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<String>,
}

impl ConfluenceResult {
    /// Package the pieces of one scoring call.
    pub fn assemble(
        weighted_sum: f64,
        quality: QualityMetrics,
        adjustment: Adjustment,
        mode: &str,
        breakdown: Vec<ComponentBreakdown>,
        rejected: Vec<String>,
    ) -> Self {
        Self {
            base_score: adjustment.base_score,
            adjusted_score: adjustment.adjusted_score,
            consensus: quality.consensus,
            confidence: quality.confidence,
            disagreement: quality.disagreement,
            quality_impact: adjustment.quality_impact,
            adjustment_type: adjustment.adjustment_type,
            weighted_sum,
            mode: mode.to_string(),
            amplification_factor: adjustment.amplification_factor,
            breakdown,
            rejected,
        }
    }

    pub fn quality(&self) -> QualityMetrics {
        QualityMetrics {
            disagreement: self.disagreement,
            consensus: self.consensus,
            confidence: self.confidence,
        }
    }

    /// Top `n` components by absolute weighted contribution.
    pub fn top_contributors(&self, n: usize) -> Vec<&ComponentBreakdown> {
        let mut all: Vec<&ComponentBreakdown> = self.breakdown.iter().collect();
        all.sort_by(|a, b| {
            b.weighted_contribution
                .abs()
                .total_cmp(&a.weighted_contribution.abs())
                .then_with(|| a.name.cmp(&b.name))
        });
        all.truncate(n);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfluenceResult {
        let quality = QualityMetrics {
            disagreement: 0.02,
            consensus: (-0.04f64).exp(),
            confidence: 0.3,
        };
        let adjustment = Adjustment {
            base_score: 66.0,
            adjusted_score: 54.8,
            quality_impact: -11.2,
            adjustment_type: AdjustmentType::Dampened,
            amplification_factor: None,
        };
        ConfluenceResult::assemble(
            0.32,
            quality,
            adjustment,
            "dampen_only",
            vec![
                ComponentBreakdown::new("technical", ComponentKind::Technical, 70.0, 0.4, 0.5),
                ComponentBreakdown::new("volume", ComponentKind::Volume, 62.0, 0.24, 0.5),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn serialized_shape_is_stable() {
        let v = serde_json::to_value(sample()).unwrap();
        assert_eq!(v["adjustment_type"], serde_json::json!("dampened"));
        assert_eq!(v["mode"], serde_json::json!("dampen_only"));
        assert!(v.get("rejected").is_none());
        assert!(v.get("amplification_factor").is_none());
        let c = &v["breakdown"][0];
        assert_eq!(c["name"], serde_json::json!("technical"));
        assert_eq!(c["kind"], serde_json::json!("technical"));
        assert!((c["weighted_contribution"].as_f64().unwrap() - 0.2).abs() < 1e-12);
        assert!(c.get("clamped").is_none());
    }

    #[test]
    fn top_contributors_by_magnitude() {
        let r = sample();
        let top = r.top_contributors(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "technical");
    }
}
