mod extract;
mod hostinfo;
mod markers;
mod models;
mod report;
mod runner;
mod sweep;

use std::env;
use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use crate::extract::MetricLabels;
use crate::report::Report;
use crate::runner::{BenchRoutine, ProcessRoutine, SweepOptions};

const DEFAULT_BENCH_CMD: &str = "benchmark_app";
const DEFAULT_LATENCY_LABEL: &str = "AVG:";

fn print_usage(app_name: &str) {
    println!("benchsweep - parametric benchmark front end");
    println!();
    println!("Expands variable parameters in a benchmark command line and runs the");
    println!("benchmark once per combination, collecting the results in a CSV report.");
    println!();
    println!("Marker prefixes:");
    println!("  $ : range   - $1,8,2 expands to [1, 3, 5, 7]");
    println!("  % : list    - %CPU,GPU expands to [CPU, GPU]");
    println!("  @ : models  - @models expands to the paired .xml/.bin models under 'models'");
    println!();
    println!("Harness options (consumed before expansion):");
    println!("  --bench-cmd <program>    benchmark command to invoke (default: {})", DEFAULT_BENCH_CMD);
    println!("  --latency-label <label>  output label scraped as latency (default: {})", DEFAULT_LATENCY_LABEL);
    println!("  --dry-run                write the expanded commands, run nothing");
    println!("  -h, --help               show this help");
    println!();
    println!("Example:");
    println!("  {} -cdir cache -m resnet.xml -nthreads $1,6,2 -nstreams %1,2,4,8 -d %CPU,GPU", app_name);
    println!("  {} -m @models -niter 100 -nthreads %1,2,4,8 -d %CPU", app_name);
    println!();
    println!("The report is written to result_DDMM-HHMMSS.csv in the current directory.");
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("benchsweep=info".parse().unwrap()),
        )
        .init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let args: Vec<String> = env::args().collect();
    let app_name = args.first().map(String::as_str).unwrap_or("benchsweep");

    if args.len() < 2 {
        print_usage(app_name);
        return Ok(0);
    }

    let mut dry_run = false;
    let mut bench_cmd = DEFAULT_BENCH_CMD.to_string();
    let mut latency_label = DEFAULT_LATENCY_LABEL.to_string();
    let mut template_tokens = Vec::new();

    // Harness flags are pulled out here; everything else is template
    // material for the benchmark command, markers included.
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage(app_name);
                return Ok(0);
            }
            "--dry-run" => dry_run = true,
            "--bench-cmd" => {
                bench_cmd = iter
                    .next()
                    .context("Missing value for --bench-cmd")?
                    .clone();
            }
            "--latency-label" => {
                latency_label = iter
                    .next()
                    .context("Missing value for --latency-label")?
                    .clone();
            }
            _ => template_tokens.push(arg.clone()),
        }
    }

    let expansion = markers::expand(&bench_cmd, &template_tokens)?;
    println!("{}", expansion.template);

    let mut routine = ProcessRoutine::new(bench_cmd);
    let host = hostinfo::collect();
    let toolkit_version = routine.toolkit_version();
    info!(cpu = %host.cpu, os = %host.os, "Collected host environment");

    let report_path = report::report_path(Local::now());
    let file = File::create(&report_path)
        .with_context(|| format!("Failed to create report file {}", report_path.display()))?;
    let mut report = Report::new(file);
    report.write_header(&host, &toolkit_version, &latency_label)?;

    let capture_path = capture_path();
    let opts = SweepOptions {
        dry_run,
        labels: MetricLabels::with_latency(latency_label),
    };
    let result = runner::run_sweep(&expansion, &mut routine, &mut report, &capture_path, &opts);
    let _ = std::fs::remove_file(&capture_path);
    result?;

    println!("Report written to {}", report_path.display());
    Ok(0)
}

/// Per-process capture file, truncated before every run by the runner.
fn capture_path() -> PathBuf {
    env::temp_dir().join(format!("benchsweep_capture_{}.txt", std::process::id()))
}
