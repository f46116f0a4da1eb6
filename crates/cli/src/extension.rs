// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-test entry point used by test runners.
//!
//! A runner builds one [`SelectionExtension`] and one [`RunContext`] per run
//! and asks [`SelectionExtension::evaluate`] about every candidate test. The
//! change source is consulted once, on the first evaluation that needs it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::cache::{DetectionOutcome, RunContext};
use crate::change::{SourceLayout, to_changes};
use crate::decision::{Decision, decide};
use crate::error::{Error, Result};
use crate::git::ChangeSource;
use crate::graph::{ModuleGraph, package_of};

/// A test class (`a.b.OrderTest`) or test method (`a.b.OrderTest#rejects`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestCandidate {
    class: String,
    method: Option<String>,
}

impl TestCandidate {
    pub fn parse(identity: &str) -> Result<Self> {
        let invalid = || Error::Argument(format!("invalid test identity `{identity}`"));

        let (class, method) = match identity.split_once('#') {
            Some((class, method)) if !method.is_empty() => (class, Some(method.to_string())),
            Some(_) => return Err(invalid()),
            None => (identity, None),
        };

        let valid_class = !class.is_empty()
            && class
                .split('.')
                .all(|s| !s.is_empty() && !s.contains(char::is_whitespace));
        if !valid_class {
            return Err(invalid());
        }

        Ok(Self {
            class: class.to_string(),
            method,
        })
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Package of the test class.
    pub fn package(&self) -> &str {
        package_of(&self.class)
    }
}

impl FromStr for TestCandidate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TestCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{}#{}", self.class, method),
            None => f.write_str(&self.class),
        }
    }
}

/// Decides run/skip for candidate tests of one repository.
pub struct SelectionExtension {
    repo_root: PathBuf,
    source: Box<dyn ChangeSource>,
    layout: SourceLayout,
}

impl SelectionExtension {
    pub fn new(repo_root: impl Into<PathBuf>, source: Box<dyn ChangeSource>, layout: SourceLayout) -> Self {
        Self {
            repo_root: repo_root.into(),
            source,
            layout,
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    pub fn source(&self) -> &dyn ChangeSource {
        self.source.as_ref()
    }

    /// Classified changes for the run, detected on first call.
    pub fn outcome(&self, run: &RunContext) -> Arc<DetectionOutcome> {
        run.changes(|| self.detect())
    }

    /// Run or skip `candidate`.
    ///
    /// Method-level candidates always run; the decision is taken for the
    /// class. A class whose package belongs to no module also runs.
    pub fn evaluate(
        &self,
        run: &RunContext,
        graph: &dyn ModuleGraph,
        candidate: &TestCandidate,
    ) -> Decision {
        let decision = if candidate.method().is_some() {
            Decision::run("method of an enabled test class")
        } else {
            match graph.module_for_package(candidate.package()) {
                None => Decision::run("unable to locate module"),
                Some(module) => decide(module, &self.outcome(run), graph),
            }
        };

        tracing::trace!("{}: {} ({})", candidate, decision.verdict, decision.reason);
        decision
    }

    fn detect(&self) -> DetectionOutcome {
        match self.source.modified_files(&self.repo_root) {
            Ok(paths) => {
                let changes = to_changes(&paths, &self.layout);
                tracing::debug!(
                    "{}: {} changes from {} paths",
                    self.source.describe(),
                    changes.len(),
                    paths.len()
                );
                DetectionOutcome::Changes(changes)
            }
            Err(err) => {
                tracing::error!(
                    "change detection failed ({}), running all tests: {}",
                    self.source.describe(),
                    err
                );
                DetectionOutcome::Failed(err)
            }
        }
    }
}

impl fmt::Debug for SelectionExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionExtension")
            .field("repo_root", &self.repo_root)
            .field("source", &self.source.describe())
            .field("layout", &self.layout)
            .finish()
    }
}

#[cfg(test)]
#[path = "extension_tests.rs"]
mod tests;
