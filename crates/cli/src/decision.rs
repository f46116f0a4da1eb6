// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run/skip decisions over the module dependency graph.
//!
//! A candidate module runs when it, or any module it reaches by following
//! "depends on" edges, owns a changed compilation unit. An empty change set,
//! a change set without compilation units (resources, build files only), or
//! a failed detection always runs.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use serde::Serialize;

use crate::cache::DetectionOutcome;
use crate::change::ChangeSet;
use crate::graph::ModuleGraph;

/// Binary outcome for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Run,
    Skip,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Run => f.pad("RUN"),
            Verdict::Skip => f.pad("SKIP"),
        }
    }
}

/// A verdict with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub verdict: Verdict,
    pub reason: String,
}

impl Decision {
    pub fn run(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Run,
            reason: reason.into(),
        }
    }

    pub fn skip(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Skip,
            reason: reason.into(),
        }
    }

    pub fn is_run(&self) -> bool {
        self.verdict == Verdict::Run
    }
}

/// `candidate` plus every module reachable through dependency edges.
///
/// Worklist traversal guarded by a visited set; cycles terminate and graph
/// depth does not consume stack.
pub fn reachable_modules<'a, G>(graph: &'a G, candidate: &'a str) -> BTreeSet<&'a str>
where
    G: ModuleGraph + ?Sized,
{
    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::from([candidate]);

    while let Some(module) = queue.pop_front() {
        if !visited.insert(module) {
            continue;
        }
        for dependency in graph.direct_dependencies(module) {
            if !visited.contains(dependency) {
                queue.push_back(dependency);
            }
        }
    }

    visited
}

/// Decide whether tests of `candidate` must run for a known change set.
///
/// Membership is checked as a set operation, so neither the order of
/// `changes` nor the order of modules in `graph` affects the verdict. When
/// several dependencies changed, the reason names the first one by name.
pub fn should_run<G>(candidate: &str, changes: &ChangeSet, graph: &G) -> Decision
where
    G: ModuleGraph + ?Sized,
{
    if changes.is_empty() {
        return Decision::run("no changes detected");
    }
    if changes.entities().next().is_none() {
        return Decision::run("no compilation-unit changes detected");
    }

    let changed_in = |module: &str| changes.entities().any(|e| graph.contains_entity(module, e));

    if changed_in(candidate) {
        return Decision::run(format!("changes in module `{candidate}`"));
    }

    let reachable = reachable_modules(graph, candidate);
    match reachable
        .iter()
        .filter(|module| **module != candidate)
        .find(|module| changed_in(module))
    {
        Some(dependency) => Decision::run(format!(
            "changes in dependency `{dependency}` of module `{candidate}`"
        )),
        None => Decision::skip(format!(
            "no changes in module `{candidate}` or its dependencies"
        )),
    }
}

/// Decide for a detection outcome, running everything when detection failed.
pub fn decide<G>(candidate: &str, outcome: &DetectionOutcome, graph: &G) -> Decision
where
    G: ModuleGraph + ?Sized,
{
    match outcome {
        DetectionOutcome::Changes(changes) => should_run(candidate, changes, graph),
        DetectionOutcome::Failed(_) => Decision::run("change detection failed"),
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
