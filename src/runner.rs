//! Sweep execution.
//!
//! Runs the benchmarking routine once per combination, strictly
//! sequentially. Each run gets a fresh argument vector and a fresh,
//! truncated capture file as its output sink, so no run's text can leak
//! into another's metrics. A failing run is logged and its row completed
//! with missing-metric markers; the sweep continues.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use crate::extract::{extract_metrics, MetricLabels, Metrics};
use crate::markers::Expansion;
use crate::report::Report;
use crate::sweep::{count, Combinations};

/// The benchmarking routine seam.
///
/// The routine receives a process-style argument vector (first element
/// conventionally the program name) and writes its diagnostic text to the
/// sink it is handed. The sink is per-run; nothing about the routine's
/// return value is inspected beyond success or failure.
pub trait BenchRoutine {
    fn invoke(&mut self, argv: &[String], out: &mut dyn Write) -> Result<()>;

    /// Version string of the underlying benchmark toolkit, for the report
    /// header. Read once per sweep.
    fn toolkit_version(&mut self) -> String;
}

/// Production routine: spawns `argv[0]` as an external process with the
/// remaining arguments, pipes its stdout into the sink, and discards its
/// stderr.
pub struct ProcessRoutine {
    program: String,
}

impl ProcessRoutine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl BenchRoutine for ProcessRoutine {
    fn invoke(&mut self, argv: &[String], out: &mut dyn Write) -> Result<()> {
        let (program, args) = argv
            .split_first()
            .context("Benchmark argument vector is empty")?;

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .with_context(|| format!("Failed to execute {}", program))?;

        out.write_all(&output.stdout)
            .context("Failed to write captured benchmark output")?;

        if !output.status.success() {
            bail!(
                "{} exited with status {}",
                program,
                output.status.code().unwrap_or(-1)
            );
        }
        Ok(())
    }

    fn toolkit_version(&mut self) -> String {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();

        match output {
            Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout)
                .lines()
                .next()
                .unwrap_or("")
                .trim()
                .to_string(),
            _ => "unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SweepOptions {
    /// Write the substituted commands without invoking the routine.
    pub dry_run: bool,
    pub labels: MetricLabels,
}

/// Runs every combination of the expansion and streams one report row per
/// combination.
pub fn run_sweep<W: Write>(
    expansion: &Expansion,
    routine: &mut dyn BenchRoutine,
    report: &mut Report<W>,
    capture_path: &Path,
    opts: &SweepOptions,
) -> Result<()> {
    let total = count(&expansion.value_sets);
    println!("Total number of parameter combinations: {}", total);

    for (index, combo) in Combinations::new(&expansion.value_sets).enumerate() {
        let argv = expansion.template.substitute(&combo);
        println!("[{}/{}] {}", index + 1, total, argv.join(" "));

        report.begin_row(&argv)?;

        if opts.dry_run {
            report.finish_row_bare()?;
            continue;
        }

        let metrics = run_one(routine, &argv, capture_path, &opts.labels);
        report.finish_row(&metrics)?;
    }

    Ok(())
}

/// Invokes the routine for one combination and extracts its metrics. All
/// per-run failures are absorbed here: they cost this combination its
/// metrics, never the rest of the sweep.
fn run_one(
    routine: &mut dyn BenchRoutine,
    argv: &[String],
    capture_path: &Path,
    labels: &MetricLabels,
) -> Metrics {
    // Truncate-create so nothing from the previous run survives, even if
    // this run writes no output at all.
    let mut capture = match File::create(capture_path) {
        Ok(file) => file,
        Err(err) => {
            warn!("Failed to create capture file {:?}: {}", capture_path, err);
            return Metrics::default();
        }
    };

    if let Err(err) = routine.invoke(argv, &mut capture) {
        warn!("Benchmark run failed for '{}': {:#}", argv.join(" "), err);
    }
    drop(capture);

    let text = match fs::read_to_string(capture_path) {
        Ok(text) => text,
        Err(err) => {
            warn!("Failed to read capture file {:?}: {}", capture_path, err);
            String::new()
        }
    };
    debug!("Captured {} bytes of benchmark output", text.len());

    extract_metrics(&text, labels)
}
