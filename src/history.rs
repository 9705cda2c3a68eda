//! history.rs: bounded in-memory log of scored results for diagnostics.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::adjust::AdjustmentType;
use crate::result::ConfluenceResult;

const MAX_CAP: usize = 10_000;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub ts_unix: u64,
    pub symbol: String,
    pub base_score: f64,
    pub adjusted_score: f64,
    pub adjustment_type: AdjustmentType,
    pub confidence: f64,
    // short explainability fingerprint: top contributors by |contribution|
    pub top_components: Vec<String>,
}

#[derive(Debug)]
pub struct History {
    entries: Mutex<VecDeque<HistoryEntry>>,
    cap: usize,
}

impl History {
    /// Keeps at most `cap` entries (never more than 10 000); oldest fall off first.
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_CAP);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(cap)),
            cap,
        }
    }

    fn entries(&self) -> MutexGuard<'_, VecDeque<HistoryEntry>> {
        match self.entries.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn push(&self, symbol: &str, r: &ConfluenceResult) {
        let entry = HistoryEntry {
            ts_unix: now_unix(),
            symbol: symbol.to_string(),
            base_score: r.base_score,
            adjusted_score: r.adjusted_score,
            adjustment_type: r.adjustment_type,
            confidence: r.confidence,
            top_components: r
                .top_contributors(3)
                .into_iter()
                .map(|c| c.name.clone())
                .collect(),
        };

        let mut ring = self.entries();
        if ring.len() == self.cap {
            ring.pop_front();
        }
        ring.push_back(entry);
    }

    /// Newest `n` entries, oldest first.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let ring = self.entries();
        let skip = ring.len().saturating_sub(n);
        ring.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
