//! # Cycle Cache
//! Caller-owned memo of scoring results for one analysis cycle, keyed by
//! `(symbol, cycle_id)`.
//!
//! The engine itself is stateless; whoever drives the cycle owns one of these
//! and passes it around explicitly. Starting a new cycle drops every entry
//! from older cycles.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::ScoringError;
use crate::result::ConfluenceResult;

#[derive(Debug, Default)]
pub struct CycleCache {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cycle_id: u64,
    entries: HashMap<(String, u64), ConfluenceResult>,
}

impl CycleCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Begin cycle `id`, evicting results from any other cycle.
    pub fn start_cycle(&self, id: u64) {
        let mut inner = self.lock();
        inner.cycle_id = id;
        inner.entries.retain(|(_, c), _| *c == id);
    }

    pub fn current_cycle(&self) -> u64 {
        self.lock().cycle_id
    }

    pub fn get(&self, symbol: &str, cycle_id: u64) -> Option<ConfluenceResult> {
        self.lock()
            .entries
            .get(&(symbol.to_string(), cycle_id))
            .cloned()
    }

    /// Return the cached result for `(symbol, current cycle)` or compute,
    /// store and return it. Errors are returned as-is and never cached.
    pub fn get_or_score<F>(&self, symbol: &str, compute: F) -> Result<ConfluenceResult, ScoringError>
    where
        F: FnOnce() -> Result<ConfluenceResult, ScoringError>,
    {
        let cycle = self.current_cycle();
        if let Some(hit) = self.get(symbol, cycle) {
            return Ok(hit);
        }
        // Computed outside the lock; scoring is pure so a racing duplicate is harmless.
        let fresh = compute()?;
        self.lock()
            .entries
            .insert((symbol.to_string(), cycle), fresh.clone());
        Ok(fresh)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ConfluenceEngine;
    use crate::normalize::ComponentScores;
    use std::cell::Cell;

    fn scores(v: f64) -> ComponentScores {
        [("technical".to_string(), v)].into_iter().collect()
    }

    #[test]
    fn computes_once_per_symbol_and_cycle() {
        let engine = ConfluenceEngine::default();
        let cache = CycleCache::new();
        cache.start_cycle(7);
        let calls = Cell::new(0);

        for _ in 0..3 {
            let r = cache
                .get_or_score("BTCUSDT", || {
                    calls.set(calls.get() + 1);
                    engine.score(&scores(70.0))
                })
                .unwrap();
            assert!((r.base_score - 70.0).abs() < 1e-9);
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn new_cycle_evicts_old_entries() {
        let engine = ConfluenceEngine::default();
        let cache = CycleCache::new();
        cache.start_cycle(1);
        cache.get_or_score("ETHUSDT", || engine.score(&scores(30.0))).unwrap();
        assert!(cache.get("ETHUSDT", 1).is_some());

        cache.start_cycle(2);
        assert!(cache.is_empty());
        assert!(cache.get("ETHUSDT", 1).is_none());
    }

    #[test]
    fn errors_are_not_cached() {
        let engine = ConfluenceEngine::default();
        let cache = CycleCache::new();
        let err = cache
            .get_or_score("SOLUSDT", || engine.score(&ComponentScores::new()))
            .unwrap_err();
        assert_eq!(err, ScoringError::EmptyInput);
        assert!(cache.is_empty());
    }
}
