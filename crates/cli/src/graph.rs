// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Module dependency graph.
//!
//! [`ModuleGraph`] is the query surface the decision engine needs. The graph
//! itself is produced elsewhere; [`StaticModuleGraph`] reads a declarative
//! description of it:
//!
//! ```toml
//! [[module]]
//! name = "orders"
//! packages = ["com.acme.orders"]
//! depends-on = ["inventory"]
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Read-only view of a module dependency graph.
pub trait ModuleGraph: Send + Sync {
    /// Whether `module` owns the compilation unit `entity`.
    fn contains_entity(&self, module: &str, entity: &str) -> bool;

    /// Modules that `module` depends on directly. Unknown modules have none.
    fn direct_dependencies(&self, module: &str) -> Vec<&str>;

    /// Module owning the given package, if any.
    fn module_for_package(&self, package: &str) -> Option<&str>;
}

/// Declaration of a single module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModuleSpec {
    /// Unique module name.
    pub name: String,

    /// Base packages; every entity in or below them belongs to the module.
    #[serde(default)]
    pub packages: Vec<String>,

    /// Additional identities owned by the module outside its packages.
    #[serde(default)]
    pub entities: Vec<String>,

    /// Names of modules this module depends on.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.packages.push(package.into());
        self
    }

    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.entities.push(entity.into());
        self
    }

    pub fn dependency(mut self, module: impl Into<String>) -> Self {
        self.depends_on.push(module.into());
        self
    }
}

/// On-disk format of a graph description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Toml,
    Json,
    Yaml,
}

impl GraphFormat {
    /// Pick the format from the file extension, defaulting to TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => GraphFormat::Json,
            Some("yaml" | "yml") => GraphFormat::Yaml,
            _ => GraphFormat::Toml,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GraphFile {
    #[serde(default, alias = "module")]
    modules: Vec<ModuleSpec>,
}

#[derive(Debug, Clone)]
struct ModuleNode {
    packages: Vec<String>,
    entities: HashSet<String>,
    dependencies: BTreeSet<String>,
}

/// In-memory module graph built from [`ModuleSpec`]s.
#[derive(Debug, Clone, Default)]
pub struct StaticModuleGraph {
    modules: BTreeMap<String, ModuleNode>,
}

impl StaticModuleGraph {
    /// Build a graph, rejecting duplicate names and undeclared dependencies.
    pub fn from_specs(specs: impl IntoIterator<Item = ModuleSpec>) -> Result<Self> {
        let mut modules = BTreeMap::new();

        for spec in specs {
            let node = ModuleNode {
                packages: spec.packages,
                entities: spec.entities.into_iter().collect(),
                dependencies: spec.depends_on.into_iter().collect(),
            };
            if modules.insert(spec.name.clone(), node).is_some() {
                return Err(graph_error(format!("duplicate module `{}`", spec.name)));
            }
        }

        for (name, node) in &modules {
            if let Some(missing) = node
                .dependencies
                .iter()
                .find(|dep| !modules.contains_key(dep.as_str()))
            {
                return Err(graph_error(format!(
                    "module `{name}` depends on undeclared module `{missing}`"
                )));
            }
        }

        Ok(Self { modules })
    }

    /// Load a graph description from a TOML, JSON, or YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content, GraphFormat::from_path(path)).map_err(|e| match e {
            Error::Config { message, .. } => Error::Config {
                message,
                path: Some(path.to_path_buf()),
            },
            other => other,
        })
    }

    /// Parse a graph description.
    pub fn parse(content: &str, format: GraphFormat) -> Result<Self> {
        let file: GraphFile = match format {
            GraphFormat::Toml => toml::from_str(content).map_err(|e| graph_error(e.to_string()))?,
            GraphFormat::Json => {
                serde_json::from_str(content).map_err(|e| graph_error(e.to_string()))?
            }
            GraphFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| graph_error(e.to_string()))?
            }
        };

        Self::from_specs(file.modules)
    }

    /// Declared module names, sorted.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleGraph for StaticModuleGraph {
    fn contains_entity(&self, module: &str, entity: &str) -> bool {
        let Some(node) = self.modules.get(module) else {
            return false;
        };

        if node.entities.contains(entity) {
            return true;
        }

        let package = package_of(entity);
        node.packages.iter().any(|base| is_within(package, base))
    }

    fn direct_dependencies(&self, module: &str) -> Vec<&str> {
        self.modules
            .get(module)
            .map(|node| node.dependencies.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn module_for_package(&self, package: &str) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;

        for (name, node) in &self.modules {
            for base in &node.packages {
                if is_within(package, base) && best.is_none_or(|(_, len)| base.len() > len) {
                    best = Some((name.as_str(), base.len()));
                }
            }
        }

        best.map(|(name, _)| name)
    }
}

/// Package part of a dotted identity (`a.b.C` -> `a.b`).
pub fn package_of(entity: &str) -> &str {
    entity.rsplit_once('.').map_or("", |(package, _)| package)
}

/// Whether `package` equals `base` or is one of its sub-packages.
fn is_within(package: &str, base: &str) -> bool {
    match package.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

fn graph_error(message: String) -> Error {
    Error::Config {
        message: format!("module graph: {message}"),
        path: None,
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
