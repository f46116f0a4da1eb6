// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run-scoped memoization of change detection.
//!
//! Detection runs at most once per key per run. Concurrent first
//! callers block on the same slot until the winner has stored its outcome;
//! a failure is stored and replayed just like a success.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::change::ChangeSet;
use crate::git::DetectionError;

/// Key under which the run's change set is stored.
pub const CHANGES_KEY: &str = "modgate.changes";

/// Result of detecting changes for a run.
#[derive(Debug)]
pub enum DetectionOutcome {
    /// Detection succeeded.
    Changes(ChangeSet),
    /// Detection failed; decisions fall back to running everything.
    Failed(DetectionError),
}

impl DetectionOutcome {
    pub fn changes(&self) -> Option<&ChangeSet> {
        match self {
            DetectionOutcome::Changes(changes) => Some(changes),
            DetectionOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&DetectionError> {
        match self {
            DetectionOutcome::Changes(_) => None,
            DetectionOutcome::Failed(err) => Some(err),
        }
    }
}

impl From<Result<ChangeSet, DetectionError>> for DetectionOutcome {
    fn from(result: Result<ChangeSet, DetectionError>) -> Self {
        match result {
            Ok(changes) => DetectionOutcome::Changes(changes),
            Err(err) => DetectionOutcome::Failed(err),
        }
    }
}

/// Compute-once store of detection outcomes.
#[derive(Debug, Default)]
pub struct DecisionCache {
    /// One slot per key; the slot is created before it is filled so that
    /// concurrent callers share it.
    slots: DashMap<String, Arc<OnceLock<Arc<DetectionOutcome>>>>,
    /// Number of times a compute closure actually ran.
    computations: AtomicUsize,
}

impl DecisionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the outcome stored under `key`, computing it on first access.
    ///
    /// `compute` runs at most once per key, even under concurrent first
    /// access. Every caller receives the same `Arc`.
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> Arc<DetectionOutcome>
    where
        F: FnOnce() -> DetectionOutcome,
    {
        // Clone the slot out so the shard lock is released before computing
        let slot = Arc::clone(&self.slots.entry(key.to_string()).or_default());

        let outcome = slot.get_or_init(|| {
            self.computations.fetch_add(1, Ordering::SeqCst);
            Arc::new(compute())
        });
        Arc::clone(outcome)
    }

    /// Outcome stored under `key`, if already computed.
    pub fn get(&self, key: &str) -> Option<Arc<DetectionOutcome>> {
        self.slots
            .get(key)
            .and_then(|slot| slot.value().get().map(Arc::clone))
    }

    /// Number of compute closures executed so far.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::SeqCst)
    }
}

/// State owned by the test-run orchestrator and shared by every decision.
///
/// A fresh context means a fresh detection; nothing is kept in statics.
#[derive(Debug, Default)]
pub struct RunContext {
    cache: DecisionCache,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &DecisionCache {
        &self.cache
    }

    /// The run's change set, detected on first call.
    pub fn changes<F>(&self, detect: F) -> Arc<DetectionOutcome>
    where
        F: FnOnce() -> DetectionOutcome,
    {
        self.cache.get_or_compute(CHANGES_KEY, detect)
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
