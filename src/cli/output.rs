//! CLI output formatting.
//!
//! Reports are built as strings by `format_*` functions and printed by
//! thin `print_*` wrappers, so the text can be checked in tests.

use std::fmt::Write as _;

use crate::config::StudyConfig;
use crate::domains::monte_carlo::{FieldStats, MonteCarloSummary};
use crate::verification::ConvergenceReport;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Print version information.
pub fn print_version() {
    match option_env!("LUNAR_DESCENT_GIT_HASH") {
        Some(hash) if !hash.is_empty() => {
            println!("lunar-descent {} ({hash})", env!("CARGO_PKG_VERSION"));
        }
        _ => println!("lunar-descent {}", env!("CARGO_PKG_VERSION")),
    }
}

/// Print help message.
pub fn print_help() {
    println!(
        r"lunar-descent - Monte Carlo study of lunar terminal descent

USAGE:
    lunar-descent <COMMAND> [OPTIONS]

COMMANDS:
    run                         Run a Monte Carlo study
        -n, --samples <N>       Number of trials (default: 1000)
        --speed-mean <V>        Mean burn-start speed, m/s downward (default: 25)
        --thrust-multiplier <K> Multiplier on nominal thrust (default: 1.0)
        --seed <S>              Master seed (default: 1)
        -c, --config <FILE>     YAML study file; flags override it
        --workers <W>           Partition trials across W workers
        --json                  Print the summary as JSON
        -v, --verbose           Debug logging on stderr

    verify                      Free-fall convergence check of the integrator
        --json                  Print the report as JSON

    reproduce [run options]     Run the study repeatedly and compare fingerprints
        --runs <R>              Number of runs (default: 3)

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    lunar-descent run --samples 5000 --seed 42
    lunar-descent run --thrust-multiplier 1.2 --speed-mean 30 --json
    lunar-descent reproduce --samples 500 --workers 4 --runs 5
    lunar-descent verify

Set RUST_LOG to control log filtering.
"
    );
}

fn format_stats(out: &mut String, label: &str, unit: &str, stats: &FieldStats) {
    let _ = writeln!(
        out,
        "  {label:<18} mean {:>9.3} {unit}  std {:>8.3}  min {:>9.3}  max {:>9.3}",
        stats.mean, stats.std_dev, stats.min, stats.max
    );
}

/// Text report for a finished study.
#[must_use]
pub fn format_summary(config: &StudyConfig, summary: &MonteCarloSummary) -> String {
    let mut out = String::new();
    let mc = &config.monte_carlo;
    let sampler = &config.sampler;

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Lunar Descent Monte Carlo");
    let _ = writeln!(
        out,
        "Seed: {}  Trials: {}  dt: {} s",
        mc.seed, mc.trials, config.simulation.dt
    );
    let _ = writeln!(
        out,
        "Speed mean: {} m/s  Thrust mean: {:.1} N (x{})",
        sampler.speed_mean,
        sampler.thrust_mean(),
        sampler.thrust_multiplier
    );
    let _ = writeln!(out, "{RULE}\n");

    let _ = writeln!(out, "Trials:");
    let _ = writeln!(out, "  Valid:    {}", summary.valid_trials);
    let _ = writeln!(out, "  Invalid:  {}", summary.invalid_count());
    let _ = writeln!(
        out,
        "  Safe:     {} ({:.2}%, 95% CI {:.2}% to {:.2}%)",
        summary.safe_count,
        100.0 * summary.safe_fraction,
        100.0 * summary.safe_fraction_ci.0,
        100.0 * summary.safe_fraction_ci.1
    );

    let _ = writeln!(out, "\nTermination:");
    let _ = writeln!(
        out,
        "  Normal touchdown:      {}",
        summary.terminations.normal_touchdown
    );
    let _ = writeln!(
        out,
        "  Impact during braking: {}",
        summary.terminations.impact_during_braking
    );

    let _ = writeln!(out, "\nStatistics:");
    format_stats(&mut out, "Touchdown speed", "m/s", &summary.touchdown_speed);
    format_stats(&mut out, "Max g-load", "g  ", &summary.max_g_load);
    format_stats(&mut out, "Touchdown time", "s  ", &summary.touchdown_time);

    if !summary.invalid_trials.is_empty() {
        let _ = writeln!(out, "\nExcluded trials:");
        for record in &summary.invalid_trials {
            let _ = writeln!(out, "  ! trial {}: {}", record.trial, record.reason);
        }
    }

    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(out, "Safe-landing fraction: {:.4}", summary.safe_fraction);
    let _ = writeln!(out, "{RULE}");
    out
}

/// Print the study report.
pub fn print_summary(config: &StudyConfig, summary: &MonteCarloSummary) {
    print!("{}", format_summary(config, summary));
}

/// Convergence table.
#[must_use]
pub fn format_convergence_report(report: &ConvergenceReport) -> String {
    let mut out = String::new();
    let study = &report.study;

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Free-fall convergence");
    let _ = writeln!(
        out,
        "h0 = {:.1} m, v0 = 0.0 m/s, g = {:.2} m/s², horizon = {:.1} s",
        study.altitude, study.gravity, study.horizon
    );
    let _ = writeln!(out, "{RULE}\n");
    let _ = writeln!(out, "  dt [s]    max |h_num - h_exact| [m]    order");
    for row in &report.rows {
        let order = row
            .order
            .map_or_else(|| "-".to_string(), |o| format!("{o:.3}"));
        let _ = writeln!(out, "  {:<8.3}  {:>26.6}    {order:>5}", row.dt, row.max_error);
    }
    let _ = writeln!(out, "\nObserved order: {:.3}", report.observed_order);
    out
}

/// Print the convergence table.
pub fn print_convergence_report(report: &ConvergenceReport) {
    print!("{}", format_convergence_report(report));
}

/// Reproducibility check output.
#[must_use]
pub fn format_reproducibility(hashes: &[String], identical: bool) -> String {
    let mut out = String::new();
    let (status, sym) = if identical {
        ("PASSED", "✓")
    } else {
        ("FAILED", "✗")
    };
    let reference = hashes.first().map_or("", String::as_str);

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Reproducibility Check");
    let _ = writeln!(out, "{RULE}\n");
    let _ = writeln!(out, "  Runs:      {}", hashes.len());
    let _ = writeln!(out, "  Identical: {identical}");
    let _ = writeln!(out, "\n  Reference Hash: {reference}");
    let _ = writeln!(out, "\n  Run Hashes:");
    for (i, hash) in hashes.iter().enumerate() {
        let mark = if hash == reference { "=" } else { "!" };
        let _ = writeln!(out, "    Run {}: {hash} {mark}", i + 1);
    }
    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(out, "{sym} Result: {status}");
    let _ = writeln!(out, "{RULE}");
    out
}

/// Print the reproducibility check.
pub fn print_reproducibility(hashes: &[String], identical: bool) {
    print!("{}", format_reproducibility(hashes, identical));
}
