// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text output formatter.
//!
//! ```text
//! RUN  a.b.OrderTest: changes in module `orders`
//! SKIP x.y.InvoiceTest: no changes in module `billing` or its dependencies
//! 2 tests: 1 run, 1 skipped
//! ```

use termcolor::{ColorChoice, StandardStream, WriteColor};

use super::{Summary, TestReport};
use crate::change::ChangeSet;
use crate::color::scheme;
use crate::decision::Verdict;

/// Text output formatter with color support.
pub struct TextFormatter<W> {
    out: W,
}

impl TextFormatter<StandardStream> {
    /// Formatter writing to stdout.
    pub fn stdout(color_choice: ColorChoice) -> Self {
        Self::new(StandardStream::stdout(color_choice))
    }
}

impl<W: WriteColor> TextFormatter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// One line per change: kind, then identity or path.
    pub fn write_changes(&mut self, changes: &ChangeSet) -> std::io::Result<()> {
        if changes.is_empty() {
            writeln!(self.out, "no changes")?;
            return Ok(());
        }

        for change in changes {
            write!(self.out, "{:<6} ", change.kind())?;
            self.out.set_color(&scheme::path())?;
            write!(self.out, "{}", change.name())?;
            self.out.reset()?;
            writeln!(self.out)?;
        }
        Ok(())
    }

    pub fn write_test(&mut self, report: &TestReport) -> std::io::Result<()> {
        let verdict = report.decision.verdict;
        let spec = match verdict {
            Verdict::Run => scheme::run(),
            Verdict::Skip => scheme::skip(),
        };
        self.out.set_color(&spec)?;
        write!(self.out, "{:<4}", verdict)?;
        self.out.reset()?;

        write!(self.out, " ")?;
        self.out.set_color(&scheme::test_name())?;
        write!(self.out, "{}", report.test)?;
        self.out.reset()?;

        write!(self.out, ": ")?;
        self.out.set_color(&scheme::reason())?;
        write!(self.out, "{}", report.decision.reason)?;
        self.out.reset()?;
        writeln!(self.out)
    }

    pub fn write_summary(&mut self, summary: &Summary) -> std::io::Result<()> {
        let noun = if summary.total == 1 { "test" } else { "tests" };
        writeln!(
            self.out,
            "{} {}: {} run, {} skipped",
            summary.total, noun, summary.run, summary.skip
        )
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
