//! CSV report writing.
//!
//! One report file per sweep, named from the sweep's start time so repeated
//! sweeps never overwrite each other. Header lines are `#`-prefixed
//! metadata; every data line is the substituted command tokens followed by
//! the four metric columns. Rows are streamed: the command part is written
//! and flushed before its run starts, so an interrupted sweep still leaves
//! every completed combination on disk.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::extract::Metrics;
use crate::hostinfo::HostInfo;

/// Column marker for a metric that was not found in the captured output.
pub const MISSING: &str = "N/A";

/// Report file name for a sweep started at `start`, second resolution.
pub fn report_path(start: DateTime<Local>) -> PathBuf {
    PathBuf::from(start.format("result_%d%m-%H%M%S.csv").to_string())
}

pub struct Report<W: Write> {
    out: W,
}

impl<W: Write> Report<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Writes the one-time metadata block: host facts, toolkit version, and
    /// the legend for the trailing four columns.
    pub fn write_header(
        &mut self,
        host: &HostInfo,
        toolkit_version: &str,
        latency_label: &str,
    ) -> Result<()> {
        writeln!(self.out, "#CPU: {}", host.cpu)?;
        writeln!(self.out, "#MEM: {}", host.memory_bytes)?;
        writeln!(self.out, "#OS: {}", host.os)?;
        writeln!(self.out, "#Toolkit: {}", toolkit_version)?;
        writeln!(
            self.out,
            "#Last 4 items in the lines : test count, duration (ms), latency {} (ms), and throughput (fps)",
            latency_label.trim_end_matches(':')
        )?;
        self.out.flush().context("Failed to write report header")
    }

    /// Writes the command part of a row and flushes, before the run starts.
    pub fn begin_row(&mut self, argv: &[String]) -> Result<()> {
        write!(self.out, "{}", argv.join(","))?;
        self.out.flush().context("Failed to write report row")
    }

    /// Completes a row with the four metric columns.
    pub fn finish_row(&mut self, metrics: &Metrics) -> Result<()> {
        writeln!(
            self.out,
            ",{},{},{},{}",
            column(&metrics.count),
            column(&metrics.duration),
            column(&metrics.latency),
            column(&metrics.throughput),
        )?;
        self.out.flush().context("Failed to write report row")
    }

    /// Completes a dry-run row: command only, no metric columns.
    pub fn finish_row_bare(&mut self) -> Result<()> {
        writeln!(self.out)?;
        self.out.flush().context("Failed to write report row")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn column(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(MISSING)
}
