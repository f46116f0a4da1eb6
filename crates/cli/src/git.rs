// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Git change detection.
//!
//! Uses git2 (libgit2) for all git operations to avoid subprocess overhead.
//! Every operation is read-only and never touches a remote.
//!
//! ## Baselines
//!
//! - `Uncommitted`: staged, unstaged, and untracked files in the working tree.
//! - `Unpushed`: `Uncommitted` plus the tree diff between the local branch tip
//!   and its upstream. A branch without an upstream contributes nothing.
//! - `DiffToReference`: tree diff between `HEAD` and any revision expression
//!   (`abc1234`, `v1.2.0`, `HEAD~1`, `origin/main`).
//!
//! ## File Detection
//!
//! Both sides of every diff delta are reported, so a rename yields the old
//! and the new location. A side equal to [`ABSENT_PATH`] never makes it into
//! the result.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use git2::{Diff, ErrorCode, Repository, Status, StatusOptions, Tree};

/// Path git reports for the missing side of an addition or deletion.
pub const ABSENT_PATH: &str = "/dev/null";

/// Repository-relative path of a changed file, exactly as git reports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModifiedFilePath(String);

impl ModifiedFilePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the placeholder git uses when a side of a delta does not exist.
    pub fn is_absent(&self) -> bool {
        self.0 == ABSENT_PATH
    }
}

impl fmt::Display for ModifiedFilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModifiedFilePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for ModifiedFilePath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Comparison point against which files count as changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Baseline {
    /// Working tree and index against `HEAD`, plus untracked files.
    Uncommitted,
    /// `Uncommitted` plus local commits not yet on the upstream branch.
    Unpushed,
    /// `HEAD` against an arbitrary revision expression.
    DiffToReference(String),
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Baseline::Uncommitted => f.write_str("uncommitted changes"),
            Baseline::Unpushed => f.write_str("unpushed changes"),
            Baseline::DiffToReference(revision) => write!(f, "diff to {revision}"),
        }
    }
}

/// Errors raised while reading repository state.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    /// No repository could be opened at or above the given path.
    #[error("no git repository at {}: {}", .path.display(), .source.message())]
    RepositoryUnavailable {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    /// The reference revision does not resolve to an object.
    #[error("unable to resolve revision `{revision}`: {}", .source.message())]
    UnresolvableRevision {
        revision: String,
        #[source]
        source: git2::Error,
    },

    /// Any other libgit2 failure.
    #[error("git error: {}", .0.message())]
    Git(#[from] git2::Error),

    /// Failure reported by a custom change source.
    #[error("{name}: {message}")]
    Source { name: String, message: String },
}

/// A policy that produces the set of changed files for a repository.
///
/// Implementations must be read-only. Custom sources are plugged in through
/// [`crate::strategy::DetectorRegistry`].
pub trait ChangeSource: Send + Sync {
    /// Stable name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Human-readable description of what the source compares against.
    fn describe(&self) -> String {
        self.name().to_string()
    }

    /// Collect changed files for the repository containing `root`.
    fn modified_files(&self, root: &Path) -> Result<BTreeSet<ModifiedFilePath>, DetectionError>;
}

/// Built-in change source backed by libgit2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitChangeSource {
    baseline: Baseline,
}

impl GitChangeSource {
    pub fn new(baseline: Baseline) -> Self {
        Self { baseline }
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }
}

impl ChangeSource for GitChangeSource {
    fn name(&self) -> &str {
        match self.baseline {
            Baseline::Uncommitted => "uncommitted",
            Baseline::Unpushed => "unpushed",
            Baseline::DiffToReference(_) => "diff",
        }
    }

    fn describe(&self) -> String {
        self.baseline.to_string()
    }

    fn modified_files(&self, root: &Path) -> Result<BTreeSet<ModifiedFilePath>, DetectionError> {
        detect(root, &self.baseline)
    }
}

/// Detect changed files relative to `baseline`.
///
/// The repository handle is scoped to this call and released on every exit
/// path, including errors from libgit2.
pub fn detect(
    root: &Path,
    baseline: &Baseline,
) -> Result<BTreeSet<ModifiedFilePath>, DetectionError> {
    let repo = open_repository(root)?;

    let files = match baseline {
        Baseline::Uncommitted => uncommitted_files(&repo)?,
        Baseline::Unpushed => {
            let mut files = uncommitted_files(&repo)?;
            files.extend(unpushed_files(&repo)?);
            files
        }
        Baseline::DiffToReference(revision) => diff_to_reference(&repo, revision)?,
    };

    tracing::debug!("{}: {} changed paths", baseline, files.len());
    Ok(files)
}

fn open_repository(root: &Path) -> Result<Repository, DetectionError> {
    Repository::discover(root).map_err(|source| DetectionError::RepositoryUnavailable {
        path: root.to_path_buf(),
        source,
    })
}

/// Modified, staged, deleted, conflicted, and untracked files.
fn uncommitted_files(repo: &Repository) -> Result<BTreeSet<ModifiedFilePath>, DetectionError> {
    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false)
        .renames_head_to_index(true)
        .renames_index_to_workdir(true);

    let statuses = repo.statuses(Some(&mut options))?;

    let mut files = BTreeSet::new();
    for entry in statuses.iter() {
        let status = entry.status();
        if status == Status::CURRENT || status.contains(Status::IGNORED) {
            continue;
        }

        if let Some(path) = entry.path() {
            insert_path(&mut files, path);
        }

        // Renames carry their other side on the delta, not on the entry
        for delta in [entry.head_to_index(), entry.index_to_workdir()]
            .into_iter()
            .flatten()
        {
            insert_delta_sides(&mut files, &delta);
        }
    }

    Ok(files)
}

/// Files that differ between the local branch and its upstream.
///
/// Detached HEAD, an unborn branch, or a branch without upstream yields an
/// empty set rather than an error.
fn unpushed_files(repo: &Repository) -> Result<BTreeSet<ModifiedFilePath>, DetectionError> {
    let Some((local, upstream)) = tracking_trees(repo)? else {
        return Ok(BTreeSet::new());
    };

    let diff = repo.diff_tree_to_tree(Some(&local), Some(&upstream), None)?;
    collect_diff(diff)
}

/// Resolve the trees of the current branch tip and its upstream.
fn tracking_trees(repo: &Repository) -> Result<Option<(Tree<'_>, Tree<'_>)>, DetectionError> {
    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
            tracing::debug!("no commits on current branch, nothing unpushed");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    if !head.is_branch() {
        tracing::debug!("HEAD is detached, nothing to compare against upstream");
        return Ok(None);
    }

    let branch = git2::Branch::wrap(head);
    let upstream = match branch.upstream() {
        Ok(upstream) => upstream,
        Err(e) if e.code() == ErrorCode::NotFound => {
            tracing::debug!(
                "branch {} has no tracking branch, nothing unpushed",
                branch.name().ok().flatten().unwrap_or("<unnamed>")
            );
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let local = branch.get().peel_to_tree()?;
    let remote = upstream.get().peel_to_tree()?;
    Ok(Some((local, remote)))
}

/// Files that differ between `revision` and `HEAD`.
fn diff_to_reference(
    repo: &Repository,
    revision: &str,
) -> Result<BTreeSet<ModifiedFilePath>, DetectionError> {
    let reference = repo.revparse_single(revision).map_err(|source| {
        DetectionError::UnresolvableRevision {
            revision: revision.to_string(),
            source,
        }
    })?;
    let base_tree = reference.peel_to_tree()?;
    let head_tree = repo.head()?.peel_to_tree()?;

    let diff = repo.diff_tree_to_tree(Some(&base_tree), Some(&head_tree), None)?;
    collect_diff(diff)
}

/// Collect both sides of every delta, with rename detection applied.
fn collect_diff(mut diff: Diff<'_>) -> Result<BTreeSet<ModifiedFilePath>, DetectionError> {
    diff.find_similar(None)?;

    let mut files = BTreeSet::new();
    for delta in diff.deltas() {
        insert_delta_sides(&mut files, &delta);
    }
    Ok(files)
}

fn insert_delta_sides(files: &mut BTreeSet<ModifiedFilePath>, delta: &git2::DiffDelta<'_>) {
    for side in [delta.old_file().path(), delta.new_file().path()]
        .into_iter()
        .flatten()
    {
        insert_path(files, &side.to_string_lossy());
    }
}

fn insert_path(files: &mut BTreeSet<ModifiedFilePath>, path: &str) {
    let path = ModifiedFilePath::new(path);
    if !path.is_absent() && !path.as_str().is_empty() {
        files.insert(path);
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
