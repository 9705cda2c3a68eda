//! Errors surfaced by a scoring call.
//!
//! Only validation failures that leave nothing sensible to score end up here.
//! Recoverable input problems (out-of-range scores, negative weights) are
//! clamped and logged where they occur and never fail a call.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// No components were supplied at all.
    #[error("no component scores supplied")]
    EmptyInput,

    /// Components were supplied, but every one of them was NaN or infinite.
    #[error("all component scores were non-finite: {}", rejected.join(", "))]
    NoFiniteInputs { rejected: Vec<String> },

    /// A caller-supplied mode parameter or threshold is unusable.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl ScoringError {
    /// Stable short label, used as a metrics label and in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::EmptyInput => "empty_input",
            ScoringError::NoFiniteInputs { .. } => "no_finite_inputs",
            ScoringError::InvalidParameter { .. } => "invalid_parameter",
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ScoringError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
