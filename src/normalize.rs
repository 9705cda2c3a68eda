//! # Signal Normalizer
//!
//! Maps a bounded component score in `[0, 100]` onto a signed unit signal in
//! `[-1, 1]` (50 is neutral). Out-of-range scores are clamped, non-finite ones
//! are rejected before they can reach any arithmetic.

use std::collections::BTreeMap;

use metrics::counter;
use tracing::warn;

use crate::metrics::{INPUTS_CLAMPED_TOTAL, INPUTS_REJECTED_TOTAL};

/// Component name → raw score, as produced by the upstream analyzers.
pub type ComponentScores = BTreeMap<String, f64>;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;
pub const NEUTRAL: f64 = 50.0;

/// `clip((value - 50) / 50, -1, 1)` on the clamped value.
///
/// Total for finite input. Non-finite input must be filtered by
/// [`validate_scores`] first; a NaN here would come back as NaN.
pub fn normalize_score(value: f64) -> f64 {
    let v = value.clamp(SCORE_MIN, SCORE_MAX);
    ((v - NEUTRAL) / NEUTRAL).clamp(-1.0, 1.0)
}

/// One finite component after clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidScore {
    /// Score as supplied by the caller.
    pub raw: f64,
    /// Score after clamping into `[0, 100]`.
    pub value: f64,
    pub clamped: bool,
}

/// Output of [`validate_scores`]: usable components plus the names dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedScores {
    pub accepted: BTreeMap<String, ValidScore>,
    pub rejected: Vec<String>,
}

impl ValidatedScores {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Normalized signal per accepted component.
    pub fn signals(&self) -> BTreeMap<String, f64> {
        self.accepted
            .iter()
            .map(|(name, s)| (name.clone(), normalize_score(s.value)))
            .collect()
    }
}

/// Clamp out-of-range scores and reject NaN/infinite ones. Every clamp and
/// rejection is logged and counted.
pub fn validate_scores(scores: &ComponentScores) -> ValidatedScores {
    let mut out = ValidatedScores::default();

    for (name, &raw) in scores {
        if !raw.is_finite() {
            warn!(component = %name, value = ?raw, "non-finite component score rejected");
            counter!(INPUTS_REJECTED_TOTAL).increment(1);
            out.rejected.push(name.clone());
            continue;
        }

        let value = raw.clamp(SCORE_MIN, SCORE_MAX);
        let clamped = value != raw;
        if clamped {
            warn!(component = %name, raw, clamped_to = value, "component score out of range");
            counter!(INPUTS_CLAMPED_TOTAL).increment(1);
        }
        out.accepted.insert(name.clone(), ValidScore { raw, value, clamped });
    }

    out
}
