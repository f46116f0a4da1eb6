// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Change source selection.
//!
//! Sources are looked up by a stable key in a [`DetectorRegistry`]. The
//! selection order is: an explicit detector key, then a reference commit,
//! then unpushed changes.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::SelectionConfig;
use crate::error::{Error, Result};
use crate::git::{Baseline, ChangeSource, GitChangeSource};

/// Registry key of the uncommitted-changes source.
pub const UNCOMMITTED: &str = "uncommitted";

/// Registry key of the unpushed-changes source.
pub const UNPUSHED: &str = "unpushed";

/// Registry key of the diff-to-reference source.
pub const DIFF: &str = "diff";

/// Revision used by the `diff` detector when no reference commit is set.
pub const DEFAULT_REFERENCE: &str = "HEAD~1";

/// Constructor for a change source.
pub type SourceFactory = Box<dyn Fn(&SelectionConfig) -> Box<dyn ChangeSource> + Send + Sync>;

/// Mapping from detector keys to source constructors.
pub struct DetectorRegistry {
    factories: BTreeMap<String, SourceFactory>,
}

impl DetectorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry holding the git-backed sources.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(UNCOMMITTED, |_| {
            Box::new(GitChangeSource::new(Baseline::Uncommitted))
        });
        registry.register(UNPUSHED, |_| {
            Box::new(GitChangeSource::new(Baseline::Unpushed))
        });
        registry.register(DIFF, |config| {
            let revision = match config.reference_commit() {
                Some(revision) => revision.to_string(),
                None => {
                    tracing::warn!(
                        "no reference commit configured for `{}`, using {}",
                        DIFF,
                        DEFAULT_REFERENCE
                    );
                    DEFAULT_REFERENCE.to_string()
                }
            };
            Box::new(GitChangeSource::new(Baseline::DiffToReference(revision)))
        });
        registry
    }

    /// Register a source under `key`, replacing any previous entry.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&SelectionConfig) -> Box<dyn ChangeSource> + Send + Sync + 'static,
    {
        self.factories.insert(key.into(), Box::new(factory));
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Instantiate the source registered under `key`.
    pub fn create(&self, key: &str, config: &SelectionConfig) -> Result<Box<dyn ChangeSource>> {
        let factory = self.factories.get(key).ok_or_else(|| Error::Config {
            message: format!(
                "unknown change detector `{}` (available: {})",
                key,
                self.keys().collect::<Vec<_>>().join(", ")
            ),
            path: None,
        })?;
        Ok(factory(config))
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for DetectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorRegistry")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Pick the change source for a run.
///
/// An unknown detector key is a configuration error, never a fallback.
pub fn select(config: &SelectionConfig, registry: &DetectorRegistry) -> Result<Box<dyn ChangeSource>> {
    if let Some(key) = config.detector() {
        let source = registry.create(key, config)?;
        tracing::info!("using configured detector `{}`: {}", key, source.describe());
        return Ok(source);
    }

    if let Some(revision) = config.reference_commit() {
        tracing::info!("comparing against reference commit {}", revision);
        return Ok(Box::new(GitChangeSource::new(Baseline::DiffToReference(
            revision.to_string(),
        ))));
    }

    tracing::info!("no detector configured, using unpushed changes");
    Ok(Box::new(GitChangeSource::new(Baseline::Unpushed)))
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
