//! # Component Metadata
//!
//! Explicit description of the analytical lens behind each component name.
//! The kind is always looked up in a caller-supplied table, never guessed
//! from the name itself.
//!
//! Each entry may also carry a `reliability` factor in `[0.0, 1.0]` that
//! scales the configured weight before normalization. Missing entries mean
//! kind `other` and reliability `1.0`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Analytical lens a component score comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Technical,
    OrderFlow,
    Volume,
    Sentiment,
    OrderBook,
    PriceStructure,
    #[default]
    Other,
}

impl ComponentKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ComponentKind::Technical => "Technical",
            ComponentKind::OrderFlow => "Order Flow",
            ComponentKind::Volume => "Volume",
            ComponentKind::Sentiment => "Sentiment",
            ComponentKind::OrderBook => "Order Book",
            ComponentKind::PriceStructure => "Price Structure",
            ComponentKind::Other => "Other",
        }
    }
}

fn default_reliability() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentMeta {
    #[serde(default)]
    pub kind: ComponentKind,
    #[serde(default = "default_reliability")]
    pub reliability: f64,
}

impl Default for ComponentMeta {
    fn default() -> Self {
        Self {
            kind: ComponentKind::Other,
            reliability: 1.0,
        }
    }
}

impl ComponentMeta {
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            reliability: 1.0,
        }
    }

    pub fn with_reliability(mut self, reliability: f64) -> Self {
        self.reliability = reliability;
        self
    }
}

/// Component name → metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentTable(pub BTreeMap<String, ComponentMeta>);

impl ComponentTable {
    /// The six lenses the scoring pipeline ships with, all fully reliable.
    pub fn standard() -> Self {
        let mut t = BTreeMap::new();
        for (name, kind) in [
            ("technical", ComponentKind::Technical),
            ("orderflow", ComponentKind::OrderFlow),
            ("volume", ComponentKind::Volume),
            ("sentiment", ComponentKind::Sentiment),
            ("orderbook", ComponentKind::OrderBook),
            ("price_structure", ComponentKind::PriceStructure),
        ] {
            t.insert(name.to_string(), ComponentMeta::new(kind));
        }
        Self(t)
    }

    pub fn insert(&mut self, name: impl Into<String>, meta: ComponentMeta) {
        self.0.insert(name.into(), meta);
    }

    pub fn kind_of(&self, name: &str) -> ComponentKind {
        self.0.get(name).map(|m| m.kind).unwrap_or_default()
    }

    /// Reliability for `name`, sanitized into `[0.0, 1.0]`.
    pub fn reliability_of(&self, name: &str) -> f64 {
        let Some(meta) = self.0.get(name) else {
            return 1.0;
        };
        let r = meta.reliability;
        if !r.is_finite() {
            warn!(component = %name, reliability = ?r, "non-finite reliability, using 1.0");
            return 1.0;
        }
        if !(0.0..=1.0).contains(&r) {
            let c = r.clamp(0.0, 1.0);
            warn!(component = %name, reliability = r, clamped_to = c, "reliability out of range");
            return c;
        }
        r
    }
}
