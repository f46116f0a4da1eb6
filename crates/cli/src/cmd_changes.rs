// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Changes command implementation.

use termcolor::ColorChoice;

use modgate::cache::{DetectionOutcome, RunContext};
use modgate::cli::{ChangesArgs, Cli, OutputFormat};
use modgate::color::resolve_color;
use modgate::error::ExitCode;
use modgate::output::ChangesReport;
use modgate::output::json::write_json;
use modgate::output::text::TextFormatter;
use modgate::session::Session;

/// Run the changes command.
pub fn run(cli: &Cli, args: &ChangesArgs) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let session = Session::open(cli, &cwd)?;

    let run = RunContext::new();
    let outcome = session.extension.outcome(&run);

    let changes = match outcome.as_ref() {
        DetectionOutcome::Changes(changes) => changes,
        DetectionOutcome::Failed(err) => {
            eprintln!("modgate: detection error: {}", err);
            return Ok(ExitCode::DetectionFailed);
        }
    };

    match args.output {
        OutputFormat::Json => {
            let report = ChangesReport {
                source: session.extension.source().describe(),
                changes,
            };
            write_json(std::io::stdout().lock(), &report)?;
        }
        OutputFormat::Text => {
            let color = if args.no_color {
                ColorChoice::Never
            } else {
                resolve_color()
            };
            let mut formatter = TextFormatter::stdout(color);
            formatter.write_changes(changes)?;
            formatter.flush()?;
        }
    }

    Ok(ExitCode::Success)
}
