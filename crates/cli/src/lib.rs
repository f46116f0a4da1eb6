// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Change-aware test selection for modular repositories.
//!
//! Changed files are read from git, classified into compilation units, and
//! matched against a module dependency graph to decide which test classes
//! must run.

pub mod cache;
pub mod change;
pub mod cli;
pub mod color;
pub mod config;
pub mod decision;
pub mod discovery;
pub mod error;
pub mod extension;
pub mod git;
pub mod graph;
pub mod output;
pub mod session;
pub mod strategy;

pub use cache::{DecisionCache, DetectionOutcome, RunContext};
pub use change::{Change, ChangeSet, SourceLayout};
pub use cli::{ChangesArgs, Cli, Command, OutputFormat, SelectArgs};
pub use decision::{Decision, Verdict};
pub use error::{Error, ExitCode, Result};
pub use extension::{SelectionExtension, TestCandidate};
pub use git::{Baseline, ChangeSource, DetectionError, GitChangeSource, ModifiedFilePath};
pub use graph::{ModuleGraph, ModuleSpec, StaticModuleGraph};
pub use strategy::DetectorRegistry;
