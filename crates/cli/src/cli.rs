// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing with clap derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Decides which test classes need to run for the changes in a git repository
#[derive(Parser)]
#[command(name = "modgate")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use specific config file
    #[arg(short = 'C', long = "config", global = true, env = "MODGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repository to inspect (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Change detector to use (uncommitted, unpushed, diff)
    #[arg(long, global = true, env = "MODGATE_DETECTOR", value_name = "KEY")]
    pub detector: Option<String>,

    /// Compare HEAD against this revision (e.g., origin/main, v1.2, HEAD~3)
    #[arg(
        long,
        global = true,
        env = "MODGATE_REFERENCE_COMMIT",
        value_name = "REV"
    )]
    pub reference_commit: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the changes the selected detector reports
    Changes(ChangesArgs),
    /// Decide run or skip for test classes
    Select(SelectArgs),
}

#[derive(clap::Args)]
pub struct ChangesArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,

    /// Disable color output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(clap::Args)]
pub struct SelectArgs {
    /// Test classes or methods (a.b.OrderTest, a.b.OrderTest#method); `-` reads stdin
    #[arg(value_name = "TEST", required = true)]
    pub tests: Vec<String>,

    /// Module graph description (overrides [graph] path)
    #[arg(long, value_name = "FILE")]
    pub graph: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,

    /// Disable color output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
