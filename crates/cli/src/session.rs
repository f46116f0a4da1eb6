// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wiring from command-line flags to a ready [`SelectionExtension`].

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{self, Config};
use crate::discovery;
use crate::error::Result;
use crate::extension::SelectionExtension;
use crate::strategy::{self, DetectorRegistry};

/// Everything a command needs to inspect one repository.
#[derive(Debug)]
pub struct Session {
    pub repo_root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub config: Config,
    pub extension: SelectionExtension,
}

impl Session {
    /// Resolve the repository, load config, and select a change source.
    ///
    /// Command-line and environment values override the config file.
    pub fn open(cli: &Cli, cwd: &Path) -> Result<Self> {
        let repo_root = match &cli.repo {
            Some(path) => cwd.join(path),
            None => cwd.to_path_buf(),
        };

        let config_path = discovery::resolve_config(cli.config.as_deref(), &repo_root)?;

        let mut config = match &config_path {
            Some(path) => {
                tracing::debug!("loading config from {}", path.display());
                config::load_with_warnings(path)?
            }
            None => {
                tracing::debug!("no config found, using defaults");
                Config::default()
            }
        };

        config.selection = config
            .selection
            .with_overrides(cli.detector.clone(), cli.reference_commit.clone());

        let source = strategy::select(&config.selection, &DetectorRegistry::with_builtins())?;
        let extension =
            SelectionExtension::new(&repo_root, source, config.layout.source_layout());

        Ok(Self {
            repo_root,
            config_path,
            config,
            extension,
        })
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
