// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for change listings and verdicts.

pub mod json;
pub mod text;

use serde::Serialize;

use crate::change::ChangeSet;
use crate::decision::{Decision, Verdict};

/// Changes reported by a detector.
#[derive(Debug, Serialize)]
pub struct ChangesReport<'a> {
    /// Description of the detector's baseline.
    pub source: String,
    pub changes: &'a ChangeSet,
}

/// Verdict for a single candidate test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestReport {
    pub test: String,
    #[serde(flatten)]
    pub decision: Decision,
}

/// Verdict counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub run: usize,
    pub skip: usize,
}

/// Verdicts for every candidate of a `select` invocation.
#[derive(Debug, Serialize)]
pub struct SelectReport {
    pub source: String,
    pub tests: Vec<TestReport>,
    pub summary: Summary,
    /// Set when detection failed and every test was run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_error: Option<String>,
}

impl SelectReport {
    pub fn new(source: String, tests: Vec<TestReport>, detection_error: Option<String>) -> Self {
        let run = tests
            .iter()
            .filter(|t| t.decision.verdict == Verdict::Run)
            .count();
        let summary = Summary {
            total: tests.len(),
            run,
            skip: tests.len() - run,
        };
        Self {
            source,
            tests,
            summary,
            detection_error,
        }
    }
}
