// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration parsing and validation.
//!
//! Handles modgate.toml parsing with version validation and unknown key warnings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::change::{DEFAULT_MAIN_MARKER, DEFAULT_SUFFIX, DEFAULT_TEST_MARKER, SourceLayout};
use crate::error::{Error, Result};

/// Currently supported config version.
pub const SUPPORTED_VERSION: i64 = 1;

/// Minimum config structure for version checking.
#[derive(Deserialize)]
struct VersionOnly {
    version: Option<i64>,
}

/// A section parsed into its known fields, keeping the rest for warnings.
#[derive(Default, Deserialize)]
struct Flexible<T> {
    #[serde(flatten)]
    known: T,

    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

/// Config with flexible parsing that captures unknown keys.
#[derive(Deserialize)]
struct FlexibleConfig {
    version: i64,

    #[serde(default)]
    selection: Flexible<SelectionConfig>,

    #[serde(default)]
    layout: Flexible<LayoutConfig>,

    #[serde(default)]
    graph: Flexible<GraphConfig>,

    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

/// Full configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Config file version (must be 1).
    pub version: i64,

    /// Which change source to use.
    pub selection: SelectionConfig,

    /// Where compilation units live in the repository.
    pub layout: LayoutConfig,

    /// Where the module graph description lives.
    pub graph: GraphConfig,
}

/// Change detection strategy options.
///
/// Blank values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SelectionConfig {
    /// Registry key of a change source that overrides every other rule.
    #[serde(default)]
    pub detector: Option<String>,

    /// Revision expression to diff `HEAD` against.
    #[serde(default)]
    pub reference_commit: Option<String>,
}

impl SelectionConfig {
    pub fn detector(&self) -> Option<&str> {
        has_text(self.detector.as_deref())
    }

    pub fn reference_commit(&self) -> Option<&str> {
        has_text(self.reference_commit.as_deref())
    }

    /// Replace fields given on the command line or in the environment.
    pub fn with_overrides(
        mut self,
        detector: Option<String>,
        reference_commit: Option<String>,
    ) -> Self {
        if detector.is_some() {
            self.detector = detector;
        }
        if reference_commit.is_some() {
            self.reference_commit = reference_commit;
        }
        self
    }
}

/// Source-root markers and file suffix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LayoutConfig {
    pub main_marker: String,
    pub test_marker: String,
    pub suffix: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            main_marker: DEFAULT_MAIN_MARKER.to_string(),
            test_marker: DEFAULT_TEST_MARKER.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl LayoutConfig {
    pub fn source_layout(&self) -> SourceLayout {
        SourceLayout::new(&self.main_marker, &self.test_marker, &self.suffix)
    }
}

/// Module graph location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GraphConfig {
    /// Graph description file; relative paths are resolved against the
    /// directory holding the config file when loaded from disk.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Load config with warnings for unknown keys.
pub fn load_with_warnings(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut config = parse_with_warnings(&content, path)?;

    if let (Some(graph), Some(dir)) = (&config.graph.path, path.parent()) {
        config.graph.path = Some(dir.join(graph));
    }

    Ok(config)
}

/// Parse config, warning on unknown keys.
pub fn parse_with_warnings(content: &str, path: &Path) -> Result<Config> {
    let (config, unknown_keys) = parse(content, path)?;

    for key in &unknown_keys {
        warn_unknown_key(path, key);
    }

    Ok(config)
}

/// Parse config, returning the unknown keys found (dotted, sorted).
pub fn parse(content: &str, path: &Path) -> Result<(Config, Vec<String>)> {
    let config_error = |message: String| Error::Config {
        message,
        path: Some(path.to_path_buf()),
    };

    // First check version
    let version_check: VersionOnly =
        toml::from_str(content).map_err(|e| config_error(e.to_string()))?;

    let version = version_check
        .version
        .ok_or_else(|| config_error("missing required field: version".to_string()))?;

    if version != SUPPORTED_VERSION {
        return Err(config_error(format!(
            "unsupported config version {} (supported: {})\n  Upgrade modgate to use this config.",
            version, SUPPORTED_VERSION
        )));
    }

    let flexible: FlexibleConfig =
        toml::from_str(content).map_err(|e| config_error(e.to_string()))?;

    let mut unknown_keys: Vec<String> = flexible.unknown.keys().cloned().collect();
    for (section, unknown) in [
        ("selection", &flexible.selection.unknown),
        ("layout", &flexible.layout.unknown),
        ("graph", &flexible.graph.unknown),
    ] {
        unknown_keys.extend(unknown.keys().map(|key| format!("{section}.{key}")));
    }
    unknown_keys.sort();

    let config = Config {
        version: flexible.version,
        selection: flexible.selection.known,
        layout: flexible.layout.known,
        graph: flexible.graph.known,
    };

    Ok((config, unknown_keys))
}

fn warn_unknown_key(path: &Path, key: &str) {
    eprintln!(
        "modgate: warning: {}: unrecognized field `{}` (ignored)",
        path.display(),
        key
    );
}

fn has_text(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
