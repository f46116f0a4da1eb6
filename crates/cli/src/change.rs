// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Classification of changed paths into logical changes.
//!
//! A path is mapped onto a dotted compilation-unit identity by locating a
//! source-root marker (`src/main/java` or `src/test/java` by default) as a
//! run of whole path segments:
//!
//! ```text
//! orders/src/main/java/com/acme/Order.java  ->  CompilationUnit(com.acme.Order)
//! orders/src/test/java/com/acme/OrderTests.java  ->  TestCompilationUnit(com.acme.OrderTests)
//! orders/src/main/resources/application.yml  ->  OtherFile(<path>)
//! ```
//!
//! Markers only match on segment boundaries: `xsrc/main/java/...` and
//! `src/main/javascript/...` are other files. When a marker occurs more than
//! once, the last occurrence wins.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::git::ModifiedFilePath;

/// Default production source root.
pub const DEFAULT_MAIN_MARKER: &str = "src/main/java";

/// Default test source root.
pub const DEFAULT_TEST_MARKER: &str = "src/test/java";

/// Default source file suffix.
pub const DEFAULT_SUFFIX: &str = ".java";

/// A classified change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Change {
    /// Production source file, carrying its dotted identity (`a.b.C`).
    CompilationUnit(String),
    /// Test source file, carrying its dotted identity.
    TestCompilationUnit(String),
    /// Any other file, carrying the repository path verbatim.
    OtherFile(String),
}

impl Change {
    /// Logical identity for compilation units, `None` for other files.
    pub fn entity(&self) -> Option<&str> {
        match self {
            Change::CompilationUnit(name) | Change::TestCompilationUnit(name) => Some(name),
            Change::OtherFile(_) => None,
        }
    }

    /// Short label for the kind of change.
    pub fn kind(&self) -> &'static str {
        match self {
            Change::CompilationUnit(_) => "source",
            Change::TestCompilationUnit(_) => "test",
            Change::OtherFile(_) => "file",
        }
    }

    /// Identity or path carried by the change.
    pub fn name(&self) -> &str {
        match self {
            Change::CompilationUnit(name)
            | Change::TestCompilationUnit(name)
            | Change::OtherFile(name) => name,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.name())
    }
}

/// Set of changes detected for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet {
    changes: BTreeSet<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn contains(&self, change: &Change) -> bool {
        self.changes.contains(change)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    /// Identities of all changed compilation units, production and test.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().filter_map(Change::entity)
    }
}

impl FromIterator<Change> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::collections::btree_set::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// Source-tree layout used to recognise compilation units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    main_marker: Vec<String>,
    test_marker: Vec<String>,
    suffix: String,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self::new(DEFAULT_MAIN_MARKER, DEFAULT_TEST_MARKER, DEFAULT_SUFFIX)
    }
}

impl SourceLayout {
    /// Markers may be written with `/` or `.` separators.
    pub fn new(main_marker: &str, test_marker: &str, suffix: &str) -> Self {
        Self {
            main_marker: marker_segments(main_marker),
            test_marker: marker_segments(test_marker),
            suffix: suffix.to_string(),
        }
    }

    /// Classify a single path.
    ///
    /// Returns `None` for the absent-side placeholder and for empty paths.
    pub fn classify(&self, path: &ModifiedFilePath) -> Option<Change> {
        if path.is_absent() || path.as_str().is_empty() {
            return None;
        }

        let segments: Vec<&str> = path
            .as_str()
            .split(['/', '\\'])
            .filter(|s| !s.is_empty())
            .collect();

        let main = find_marker(&segments, &self.main_marker);
        let test = find_marker(&segments, &self.test_marker);

        let (start, is_test) = match (main, test) {
            (Some(m), Some(t)) if t > m => (t, true),
            (Some(m), _) => (m, false),
            (None, Some(t)) => (t, true),
            (None, None) => return Some(Change::OtherFile(path.to_string())),
        };

        let Some(identity) = self.identity(&segments[start..]) else {
            return Some(Change::OtherFile(path.to_string()));
        };

        Some(if is_test {
            Change::TestCompilationUnit(identity)
        } else {
            Change::CompilationUnit(identity)
        })
    }

    /// Join the segments below a source root into a dotted identity,
    /// dropping the source suffix from the file name.
    ///
    /// Files without the source suffix (resources, `package.html`) have no
    /// identity.
    fn identity(&self, rest: &[&str]) -> Option<String> {
        let (file, packages) = rest.split_last()?;
        let stem = file.strip_suffix(self.suffix.as_str())?;
        if stem.is_empty() {
            return None;
        }

        let mut identity = packages.join(".");
        if !identity.is_empty() {
            identity.push('.');
        }
        identity.push_str(stem);
        Some(identity)
    }
}

/// Classify every path, dropping absent-side placeholders first.
pub fn to_changes<'a, I>(paths: I, layout: &SourceLayout) -> ChangeSet
where
    I: IntoIterator<Item = &'a ModifiedFilePath>,
{
    paths
        .into_iter()
        .filter(|path| !path.is_absent())
        .filter_map(|path| layout.classify(path))
        .collect()
}

fn marker_segments(marker: &str) -> Vec<String> {
    marker
        .split(['/', '\\', '.'])
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Index just past the last whole-segment occurrence of `marker`.
fn find_marker(segments: &[&str], marker: &[String]) -> Option<usize> {
    if marker.is_empty() || segments.len() < marker.len() {
        return None;
    }

    (0..=segments.len() - marker.len())
        .rev()
        .find(|&i| {
            segments[i..i + marker.len()]
                .iter()
                .zip(marker)
                .all(|(segment, expected)| *segment == expected.as_str())
        })
        .map(|i| i + marker.len())
}

#[cfg(test)]
#[path = "change_tests.rs"]
mod tests;
