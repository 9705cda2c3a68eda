//! verdict.rs: caller-side threshold policy over `adjusted_score`.
//!
//! The scoring core never looks at these thresholds. The HTTP layer and
//! downstream consumers use them to turn a score into BUY/HOLD/SELL.

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

/// Action suggested by an adjusted confluence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Buy,
    Hold,
    Sell,
}

fn default_buy() -> f64 {
    60.0
}
fn default_sell() -> f64 {
    40.0
}

/// `score >= buy` → BUY, `score <= sell` → SELL, anything between → HOLD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalThresholds {
    #[serde(default = "default_buy")]
    pub buy: f64,
    #[serde(default = "default_sell")]
    pub sell: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            buy: default_buy(),
            sell: default_sell(),
        }
    }
}

impl SignalThresholds {
    pub fn validate(&self) -> Result<(), ScoringError> {
        for (name, v) in [("thresholds.buy", self.buy), ("thresholds.sell", self.sell)] {
            if !v.is_finite() || !(0.0..=100.0).contains(&v) {
                return Err(ScoringError::invalid(name, format!("must be in [0, 100], got {v}")));
            }
        }
        if self.sell >= self.buy {
            return Err(ScoringError::invalid(
                "thresholds.sell",
                format!("must be below buy ({}), got {}", self.buy, self.sell),
            ));
        }
        Ok(())
    }
}

impl Verdict {
    pub fn from_score(adjusted_score: f64, t: &SignalThresholds) -> Self {
        if adjusted_score >= t.buy {
            Verdict::Buy
        } else if adjusted_score <= t.sell {
            Verdict::Sell
        } else {
            Verdict::Hold
        }
    }
}
