//! frechet-bench: CLI tool for Fréchet decisions on curve files.
//!
//! Loads a curve pair from a text file, decides whether the Fréchet
//! distance is at most ε and prints per-stage diagnostics. Useful for:
//!
//! - Checking a single tolerance against a pair of curves
//! - Scanning an ascending list of tolerances for the first one that
//!   becomes reachable
//! - Measuring stage durations on larger curves
//! - Rendering the free-space diagram as SVG or PNG
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin frechet-bench -- [OPTIONS] <CURVES_FILE>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::{Duration, Instant};

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use frechet_core::diagnostics::{Clock, DecisionDiagnostics};
use frechet_core::{CriticalPath, DecisionConfig, FreeSpaceDiagram};
use frechet_export::leash::DEFAULT_SAMPLES_PER_SEGMENT;
use frechet_export::{
    CurvePair, RasterConfig, SvgMetadata, SvgStyle, diagram_to_png, diagram_to_svg,
    max_leash_length, parse_curves, sample_leash,
};

/// Upper bound on the number of tolerances a sweep may evaluate.
const MAX_SWEEP_STEPS: usize = 100_000;

/// Fréchet distance decision and diagnostics on a curve pair.
///
/// Reads curves `P` and `Q` from a text file (`P`/`Q` header lines, one
/// `x y` vertex per line) and decides whether their Fréchet distance is
/// at most ε.
#[derive(Parser)]
#[command(name = "frechet-bench", version)]
struct Cli {
    /// Path to the curve pair file.
    curves_file: PathBuf,

    /// Tolerance ε.
    #[arg(long, default_value_t = DecisionConfig::DEFAULT_EPS)]
    eps: f64,

    /// Scan ascending tolerances `START:END:STEP` and report the first
    /// reachable one.
    #[arg(long, conflicts_with = "eps")]
    sweep: Option<Sweep>,

    /// Write the free-space diagram as SVG.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write the free-space diagram as PNG.
    #[arg(long)]
    png: Option<PathBuf>,

    /// Number of runs for averaging (single tolerance only).
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Full decision config as a JSON string.
    ///
    /// When provided, `--eps` is ignored. The JSON must be a valid
    /// `DecisionConfig` serialization; missing fields take defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short)]
    verbose: bool,
}

/// An ascending range of tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sweep {
    start: f64,
    end: f64,
    step: f64,
}

impl Sweep {
    /// All tolerances `start, start + step, ...` not exceeding `end`.
    #[allow(clippy::cast_precision_loss)]
    fn values(self) -> Vec<f64> {
        // Absorb rounding so an end that is a whole number of steps away
        // is included.
        let limit = self.step.mul_add(1e-9, self.end);
        (0..MAX_SWEEP_STEPS)
            .map(|k| (k as f64).mul_add(self.step, self.start))
            .take_while(|&eps| eps <= limit)
            .collect()
    }
}

impl FromStr for Sweep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [start, end, step] = parts.as_slice() else {
            return Err(format!("expected START:END:STEP, got {s:?}"));
        };
        let number = |field: &str, text: &str| {
            text.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("invalid sweep {field} {text:?}"))
        };
        let sweep = Self {
            start: number("start", start)?,
            end: number("end", end)?,
            step: number("step", step)?,
        };
        if sweep.step <= 0.0 {
            return Err("sweep step must be positive".to_owned());
        }
        if sweep.end < sweep.start {
            return Err("sweep end must not be below its start".to_owned());
        }
        if (sweep.end - sweep.start) / sweep.step >= MAX_SWEEP_STEPS as f64 {
            return Err(format!("sweep exceeds {MAX_SWEEP_STEPS} steps"));
        }
        Ok(sweep)
    }
}

/// One evaluated tolerance of a sweep.
#[derive(Debug, Serialize)]
struct SweepStep {
    eps: f64,
    reachable: bool,
}

/// Outcome of a sweep.
#[derive(Debug, Serialize)]
struct SweepReport {
    steps: Vec<SweepStep>,
    /// First tolerance at which the far corner was reachable.
    critical_eps: Option<f64>,
    critical_path: Option<CriticalPath>,
}

/// Build a [`DecisionConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and
/// `--eps` is ignored.
fn config_from_cli(cli: &Cli) -> Result<DecisionConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }
    Ok(DecisionConfig::with_eps(cli.eps))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            tracing::error!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let text = match std::fs::read_to_string(&cli.curves_file) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("Error reading {}: {e}", cli.curves_file.display());
            return ExitCode::FAILURE;
        }
    };

    let pair = match parse_curves(&text) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("Error parsing {}: {e}", cli.curves_file.display());
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        file = %cli.curves_file.display(),
        p_points = pair.p.len(),
        q_points = pair.q.len(),
        skipped_lines = pair.skipped_lines,
        "loaded curves"
    );
    tracing::debug!(?config, "decision config");

    let diagram = match cli.sweep {
        Some(sweep) => {
            if cli.runs > 1 {
                tracing::warn!("--runs is ignored in sweep mode");
            }
            match run_sweep(&pair, &config, sweep, cli.json) {
                Some(diagram) => diagram,
                None => return ExitCode::FAILURE,
            }
        }
        None => match run_single(&pair, &config, cli.runs, cli.json) {
            Some(diagram) => diagram,
            None => return ExitCode::FAILURE,
        },
    };

    write_renderings(&cli, &config, &diagram);
    ExitCode::SUCCESS
}

/// Decide at one tolerance `runs` times and print each report.
///
/// Returns the propagated diagram for rendering, or `None` after logging
/// an error.
fn run_single(
    pair: &CurvePair,
    config: &DecisionConfig,
    runs: usize,
    json: bool,
) -> Option<FreeSpaceDiagram> {
    let mut all_diagnostics = Vec::with_capacity(runs);

    for run in 0..runs {
        if runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, runs);
        }

        let (decision, diagnostics) =
            frechet_core::decide_with_diagnostics(&pair.p, &pair.q, config, &StdClock);

        if json {
            match serde_json::to_string_pretty(&diagnostics) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    tracing::error!("Error serializing diagnostics: {e}");
                    return None;
                }
            }
        } else {
            println!("{}", diagnostics.report());
            if run == 0 && decision.reachable {
                let samples = sample_leash(
                    &pair.p,
                    &pair.q,
                    &decision.critical_path,
                    DEFAULT_SAMPLES_PER_SEGMENT,
                );
                if let Some(longest) = max_leash_length(&samples) {
                    println!("Longest sampled leash: {longest:.6}");
                }
            }
        }

        all_diagnostics.push(diagnostics);
    }

    if runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    let mut diagram = FreeSpaceDiagram::with_config(pair.p.clone(), pair.q.clone(), config);
    diagram.propagate();
    diagram.critical_path();
    Some(diagram)
}

/// Evaluate ascending tolerances on one diagram until the far corner
/// becomes reachable.
///
/// The diagram is left at the first reachable tolerance (or the last one
/// tried) with its critical path cached.
fn run_sweep(
    pair: &CurvePair,
    config: &DecisionConfig,
    sweep: Sweep,
    json: bool,
) -> Option<FreeSpaceDiagram> {
    let values = sweep.values();
    let mut diagram = FreeSpaceDiagram::with_config(pair.p.clone(), pair.q.clone(), config);
    let mut steps = Vec::with_capacity(values.len());

    for eps in values {
        diagram.set_eps(eps);
        diagram.propagate();
        let reachable = diagram.is_far_corner_reachable();
        tracing::debug!(eps, reachable, "sweep step");
        steps.push(SweepStep { eps, reachable });
        if reachable {
            break;
        }
    }

    let critical_path = diagram.critical_path().cloned();
    let report = SweepReport {
        steps,
        critical_eps: diagram.critical_eps(),
        critical_path,
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!("Error serializing sweep report: {e}");
                return None;
            }
        }
    } else {
        print_sweep_report(sweep, &report);
    }

    Some(diagram)
}

fn print_sweep_report(sweep: Sweep, report: &SweepReport) {
    println!(
        "Sweep {}..={} step {}\n{}",
        sweep.start,
        sweep.end,
        sweep.step,
        "=".repeat(60),
    );
    println!("{:>16}  {}", "eps", "Reachable");
    println!("{}", "-".repeat(40));
    for step in &report.steps {
        println!(
            "{:>16}  {}",
            step.eps,
            if step.reachable { "yes" } else { "no" }
        );
    }
    println!();
    match (report.critical_eps, &report.critical_path) {
        (Some(eps), Some(path)) => {
            println!("Observed critical eps: {eps} ({} path points)", path.len());
        }
        _ => println!("No reachable eps in range"),
    }
}

/// Write the SVG and PNG renderings requested on the command line.
///
/// Failures are logged and do not change the exit code.
fn write_renderings(cli: &Cli, config: &DecisionConfig, diagram: &FreeSpaceDiagram) {
    if let Some(ref svg_path) = cli.svg {
        let title = cli
            .curves_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("curves");
        let description = format!("eps={}", diagram.eps());
        let config_json = serde_json::to_string(&DecisionConfig {
            eps: diagram.eps(),
            ..config.clone()
        })
        .ok();
        let metadata = SvgMetadata {
            title: Some(title),
            description: Some(&description),
            config_json: config_json.as_deref(),
        };
        let svg = diagram_to_svg(diagram, &SvgStyle::default(), &metadata);
        write_output(svg_path, svg.as_bytes(), "SVG");
    }

    if let Some(ref png_path) = cli.png {
        match diagram_to_png(diagram, &RasterConfig::default()) {
            Ok(png) => write_output(png_path, &png, "PNG"),
            Err(e) => tracing::error!("Error rendering PNG: {e}"),
        }
    }
}

fn write_output(path: &Path, bytes: &[u8], kind: &str) {
    match std::fs::write(path, bytes) {
        Ok(()) => tracing::info!("{kind} written to {} ({} bytes)", path.display(), bytes.len()),
        Err(e) => tracing::error!("Error writing {kind} to {}: {e}", path.display()),
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&DecisionDiagnostics) -> Option<Duration>;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[DecisionDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Build", |d| Some(d.build.duration)),
        ("Propagation", |d| Some(d.propagation.duration)),
        ("Extraction", |d| d.extraction.as_ref().map(|s| s.duration)),
    ];

    for (name, extractor) in stage_extractors {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(extractor)
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .collect();

        if stage_durations.is_empty() {
            continue;
        }

        let stage_mean = stage_durations.iter().sum::<f64>() / stage_durations.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sweep_parses_three_fields() {
        let sweep: Sweep = "0.5:2:0.5".parse().unwrap();
        assert_eq!(
            sweep,
            Sweep {
                start: 0.5,
                end: 2.0,
                step: 0.5
            }
        );
        assert_eq!(sweep.values(), vec![0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn sweep_includes_end_despite_rounding() {
        let sweep: Sweep = "0:0.3:0.1".parse().unwrap();
        assert_eq!(sweep.values().len(), 4);
    }

    #[test]
    fn sweep_rejects_bad_input() {
        assert!("1:2".parse::<Sweep>().is_err());
        assert!("1:2:0".parse::<Sweep>().is_err());
        assert!("2:1:0.5".parse::<Sweep>().is_err());
        assert!("a:2:1".parse::<Sweep>().is_err());
        assert!("0:inf:1".parse::<Sweep>().is_err());
        assert!("0:1e9:1e-3".parse::<Sweep>().is_err());
    }

    #[test]
    fn config_json_overrides_eps() {
        let cli = Cli::parse_from([
            "frechet-bench",
            "curves.txt",
            "--config-json",
            r#"{"eps":2.5}"#,
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert!((config.eps - 2.5).abs() < f64::EPSILON);
        assert!(
            (config.degenerate_segment_threshold
                - DecisionConfig::DEFAULT_DEGENERATE_SEGMENT_THRESHOLD)
                .abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn eps_and_sweep_conflict() {
        let result = Cli::try_parse_from([
            "frechet-bench",
            "curves.txt",
            "--eps",
            "1",
            "--sweep",
            "0:1:0.1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn sweep_stops_at_first_reachable() {
        let pair = parse_curves("P\n0 0\n2 0\nQ\n0 1\n2 1\n").unwrap();
        let sweep: Sweep = "0.25:2:0.25".parse().unwrap();
        let diagram = run_sweep(&pair, &DecisionConfig::default(), sweep, true).unwrap();
        assert!((diagram.eps() - 1.0).abs() < 1e-12);
        assert!(diagram.is_far_corner_reachable());
        assert_eq!(diagram.critical_eps(), Some(diagram.eps()));
    }
}
