// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Select command implementation.

use std::io::BufRead;

use rayon::prelude::*;
use termcolor::ColorChoice;

use modgate::cache::{CHANGES_KEY, RunContext};
use modgate::cli::{Cli, OutputFormat, SelectArgs};
use modgate::color::resolve_color;
use modgate::error::{Error, ExitCode};
use modgate::extension::TestCandidate;
use modgate::graph::StaticModuleGraph;
use modgate::output::json::write_json;
use modgate::output::text::TextFormatter;
use modgate::output::{SelectReport, TestReport};
use modgate::session::Session;

/// Run the select command.
///
/// Detection failures never fail the command: every candidate runs and a
/// single warning is printed.
pub fn run(cli: &Cli, args: &SelectArgs) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let session = Session::open(cli, &cwd)?;

    let graph_path = match &args.graph {
        Some(path) => cwd.join(path),
        None => session.config.graph.path.clone().ok_or_else(|| {
            Error::Argument(
                "no module graph given (use --graph or set [graph] path in modgate.toml)"
                    .to_string(),
            )
        })?,
    };
    if !graph_path.is_file() {
        return Err(Error::Argument(format!(
            "module graph not found: {}",
            graph_path.display()
        ))
        .into());
    }
    let graph = StaticModuleGraph::load(&graph_path)?;
    tracing::debug!("loaded {} modules from {}", graph.len(), graph_path.display());

    let candidates = read_candidates(&args.tests)?;

    let run = RunContext::new();
    let tests: Vec<TestReport> = candidates
        .par_iter()
        .map(|candidate| TestReport {
            test: candidate.to_string(),
            decision: session.extension.evaluate(&run, &graph, candidate),
        })
        .collect();

    let detection_error = run
        .cache()
        .get(CHANGES_KEY)
        .and_then(|outcome| outcome.error().map(ToString::to_string));
    if let Some(err) = &detection_error {
        eprintln!(
            "modgate: warning: change detection failed, running all tests: {}",
            err
        );
    }

    let report = SelectReport::new(
        session.extension.source().describe(),
        tests,
        detection_error,
    );

    match args.output {
        OutputFormat::Json => write_json(std::io::stdout().lock(), &report)?,
        OutputFormat::Text => {
            let color = if args.no_color {
                ColorChoice::Never
            } else {
                resolve_color()
            };
            let mut formatter = TextFormatter::stdout(color);
            for test in &report.tests {
                formatter.write_test(test)?;
            }
            formatter.write_summary(&report.summary)?;
            formatter.flush()?;
        }
    }

    Ok(ExitCode::Success)
}

/// Parse candidate identities; `-` reads one per line from stdin.
fn read_candidates(args: &[String]) -> anyhow::Result<Vec<TestCandidate>> {
    let mut candidates = Vec::new();

    for arg in args {
        if arg == "-" {
            for line in std::io::stdin().lock().lines() {
                let line = line?;
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                candidates.push(TestCandidate::parse(line)?);
            }
        } else {
            candidates.push(TestCandidate::parse(arg)?);
        }
    }

    Ok(candidates)
}
