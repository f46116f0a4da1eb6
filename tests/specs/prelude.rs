//! Test helpers for behavioral specifications.
//!
//! Provides high-level DSL for testing modgate CLI behavior.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub use assert_cmd::prelude::*;
pub use predicates;
pub use predicates::prelude::{Predicate, PredicateBooleanExt};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Trait for converting into a string predicate.
/// Allows passing `&str` (as contains) or any `Predicate<str>`.
pub trait IntoStrPredicate<P: Predicate<str>> {
    fn into_predicate(self) -> P;
}

impl IntoStrPredicate<predicates::str::ContainsPredicate> for &str {
    fn into_predicate(self) -> predicates::str::ContainsPredicate {
        predicates::str::contains(self)
    }
}

impl<P: Predicate<str>> IntoStrPredicate<P> for P {
    fn into_predicate(self) -> P {
        self
    }
}

/// Environment variables that would leak the caller's setup into a spec.
const MODGATE_ENV: &[&str] = &[
    "MODGATE_CONFIG",
    "MODGATE_DETECTOR",
    "MODGATE_REFERENCE_COMMIT",
    "MODGATE_LOG",
];

/// Returns a Command configured to run the modgate binary
pub fn modgate_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("modgate"));
    for key in MODGATE_ENV {
        cmd.env_remove(key);
    }
    cmd
}

/// Builder for `modgate changes`
pub fn changes() -> CmdBuilder<Text> {
    CmdBuilder::new(&["changes"])
}

/// Builder for `modgate select <TEST>...`
pub fn select(tests: &[&str]) -> CmdBuilder<Text> {
    let mut args = vec!["select"];
    args.extend_from_slice(tests);
    CmdBuilder::new(&args)
}

pub struct Text;
pub struct Json;

/// Builder for a modgate invocation with chainable configuration.
pub struct CmdBuilder<Mode = Text> {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
    _mode: PhantomData<Mode>,
}

impl<Mode> CmdBuilder<Mode> {
    fn new(args: &[&str]) -> Self {
        Self {
            args: args.iter().map(|s| s.to_string()).collect(),
            dir: None,
            envs: Vec::new(),
            _mode: PhantomData,
        }
    }

    /// Set the working directory
    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    /// Append arguments
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set an environment variable
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    /// Use the module graph fixture of the given name
    pub fn graph(self, fixture_name: &str) -> Self {
        let path = fixture(fixture_name).join("modules.toml");
        self.args(&["--graph", path.to_str().unwrap()])
    }

    fn command(&self, json: bool) -> Command {
        let mut cmd = modgate_cmd();
        cmd.args(&self.args);
        if json {
            cmd.args(["-o", "json"]);
        } else {
            cmd.arg("--no-color");
        }
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }
}

impl CmdBuilder<Text> {
    /// Switch to JSON output
    pub fn json(self) -> CmdBuilder<Json> {
        CmdBuilder {
            args: self.args,
            dir: self.dir,
            envs: self.envs,
            _mode: PhantomData,
        }
    }

    /// Run and assert exit code 0
    pub fn passes(self) -> RunAssert {
        self.exits(0)
    }

    /// Run and assert the given exit code
    pub fn exits(self, code: i32) -> RunAssert {
        let output = self.command(false).output().unwrap();
        assert_eq!(
            output.status.code(),
            Some(code),
            "unexpected exit code\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        RunAssert { output }
    }

    /// Run with the given stdin and assert exit code 0
    pub fn passes_with_stdin(self, stdin: &str) -> RunAssert {
        let output = assert_cmd::Command::from_std(self.command(false))
            .write_stdin(stdin)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "expected success\nstderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

impl CmdBuilder<Json> {
    /// Run, assert exit code 0, and parse stdout as JSON
    pub fn passes(self) -> serde_json::Value {
        let output = self.command(true).output().unwrap();
        assert!(
            output.status.success(),
            "expected success\nstderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

/// Result of a run for chaining assertions
pub struct RunAssert {
    output: std::process::Output,
}

#[allow(dead_code)]
impl RunAssert {
    /// Get stdout as string
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    /// Get stderr as string
    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    /// Assert stdout equals expected (with diff on failure)
    pub fn stdout_eq(self, expected: &str) -> Self {
        let stdout = String::from_utf8_lossy(&self.output.stdout);
        similar_asserts::assert_eq!(stdout, expected);
        self
    }

    /// Assert stdout matches predicate.
    /// Prefer `stdout_eq` for strict matching.
    pub fn stdout_has<I, P>(self, predicate: I) -> Self
    where
        I: IntoStrPredicate<P>,
        P: Predicate<str>,
    {
        let stdout = String::from_utf8_lossy(&self.output.stdout);
        assert!(
            predicate.into_predicate().eval(&stdout),
            "stdout predicate failed:\n{}",
            stdout
        );
        self
    }

    /// Assert stderr matches predicate.
    pub fn stderr_has<I, P>(self, predicate: I) -> Self
    where
        I: IntoStrPredicate<P>,
        P: Predicate<str>,
    {
        let stderr = String::from_utf8_lossy(&self.output.stderr);
        assert!(
            predicate.into_predicate().eval(&stderr),
            "stderr predicate failed:\n{}",
            stderr
        );
        self
    }

    /// Assert stderr does not match predicate.
    pub fn stderr_lacks<I, P>(self, predicate: I) -> Self
    where
        I: IntoStrPredicate<P>,
        P: Predicate<str>,
    {
        let stderr = String::from_utf8_lossy(&self.output.stderr);
        assert!(
            !predicate.into_predicate().eval(&stderr),
            "stderr should NOT match predicate:\n{}",
            stderr
        );
        self
    }
}

/// Get path to a test fixture directory
pub fn fixture(name: &str) -> PathBuf {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR should be set");
    PathBuf::from(manifest_dir)
        .parent()
        .expect("parent should exist")
        .parent()
        .expect("grandparent should exist")
        .join("tests")
        .join("fixtures")
        .join(name)
}

// =============================================================================
// Project
// =============================================================================

/// Temporary test project directory with helper methods.
///
/// ```ignore
/// let temp = Project::git();
/// temp.file("src/main/java/a/b/C.java", "class C {}");
/// changes().pwd(temp.path()).args(&["--detector", "uncommitted"]).passes();
/// ```
pub struct Project {
    dir: tempfile::TempDir,
}

#[allow(dead_code)]
impl Project {
    /// Create an empty project with no files and no repository
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Create a git repository with one committed README
    pub fn git() -> Self {
        let temp = Self::empty();
        git(&temp, &["init", "-b", "main"]);
        git(&temp, &["config", "user.email", "test@example.com"]);
        git(&temp, &["config", "user.name", "Test User"]);
        git(&temp, &["config", "commit.gpgsign", "false"]);
        temp.file("README.md", "# shop\n");
        git_commit_all(&temp, "initial commit");
        temp
    }

    /// Get the project path
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write modgate.toml (auto-prefixes with `version = 1` if not present)
    pub fn config(&self, content: &str) {
        let content = if content.contains("version") {
            content.to_string()
        } else {
            format!("version = 1\n{}", content)
        };
        std::fs::write(self.dir.path().join("modgate.toml"), content).unwrap();
    }

    /// Write a file at the given path (parent directories created automatically)
    pub fn file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.dir.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full_path, content).unwrap();
    }
}

// =============================================================================
// GIT TEST HELPERS
// =============================================================================

/// Run a git command in the project, asserting success
pub fn git(project: &Project, args: &[&str]) {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(project.path())
        .output()
        .expect("git should run");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Stage everything and commit
pub fn git_commit_all(project: &Project, message: &str) {
    git(project, &["add", "-A"]);
    git(project, &["commit", "-m", message]);
}

/// Push the current branch to a fresh bare remote and track it
#[allow(dead_code)]
pub fn git_push_to_new_remote(project: &Project) -> tempfile::TempDir {
    let remote = tempfile::tempdir().unwrap();
    let status = std::process::Command::new("git")
        .args(["init", "--bare"])
        .current_dir(remote.path())
        .output()
        .expect("git init --bare should run");
    assert!(status.status.success());

    git(project, &["remote", "add", "origin", remote.path().to_str().unwrap()]);
    git(project, &["push", "-u", "origin", "HEAD"]);
    remote
}
