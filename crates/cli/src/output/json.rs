// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSON output formatter.

use std::io::Write;

use serde::Serialize;

/// Write `value` as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(mut out: W, value: &T) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut out, value).map_err(std::io::Error::other)?;
    writeln!(out)?;
    out.flush()
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
