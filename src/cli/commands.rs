//! CLI command handlers.
//!
//! Each handler returns an [`ExitCode`]; configuration errors are reported
//! on stderr before anything is printed to stdout.

use std::process::ExitCode;

use crate::config::{ExecutionStrategy, StudyConfig};
use crate::domains::monte_carlo::MonteCarloDriver;
use crate::error::DescentResult;
use crate::verification::FreeFallStudy;

use super::output::{
    print_convergence_report, print_help, print_reproducibility, print_summary, print_version,
};
use super::{Args, Command, RunOptions};

/// Allowed distance of the observed convergence order from 1.
const ORDER_TOLERANCE: f64 = 0.1;

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run(options) => run_study(&options),
        Command::Verify { json, .. } => verify_convergence(json),
        Command::Reproduce { options, runs } => reproduce(&options, runs),
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
        Command::Invalid { message } => {
            eprintln!("Error: {message}");
            eprintln!("Run 'lunar-descent help' for usage.");
            ExitCode::from(2)
        }
    }
}

/// Build the study configuration from a file (if given) and overrides.
///
/// # Errors
///
/// Returns error if the file cannot be loaded or the result is invalid.
pub fn build_config(options: &RunOptions) -> DescentResult<StudyConfig> {
    let mut config = match &options.config_path {
        Some(path) => StudyConfig::load(path)?,
        None => StudyConfig::default(),
    };

    if let Some(samples) = options.samples {
        config.monte_carlo.trials = samples;
    }
    if let Some(seed) = options.seed {
        config.monte_carlo.seed = seed;
    }
    if let Some(speed) = options.speed_mean {
        config.sampler.speed_mean = speed;
    }
    if let Some(multiplier) = options.thrust_multiplier {
        config.sampler.thrust_multiplier = multiplier;
    }
    if let Some(workers) = options.workers {
        config.monte_carlo.execution = ExecutionStrategy::Partitioned { workers };
    }

    config.ensure_valid()?;
    Ok(config)
}

/// Run one Monte Carlo study and print its summary.
#[must_use]
pub fn run_study(options: &RunOptions) -> ExitCode {
    let driver = match build_config(options).and_then(MonteCarloDriver::new) {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    match driver.run() {
        Ok(summary) => {
            if options.json {
                match summary.to_json() {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        return ExitCode::from(1);
                    }
                }
            } else {
                print_summary(driver.config(), &summary);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Run the free-fall convergence study.
///
/// Fails when the observed order is not first order.
#[must_use]
pub fn verify_convergence(json: bool) -> ExitCode {
    let report = match FreeFallStudy::default().run() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::from(1);
            }
        }
    } else {
        print_convergence_report(&report);
    }

    match report.check_first_order(ORDER_TOLERANCE) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Run the same study `runs` times and compare fingerprints.
#[must_use]
pub fn reproduce(options: &RunOptions, runs: usize) -> ExitCode {
    match fingerprints(options, runs) {
        Ok(hashes) => {
            let identical = hashes.windows(2).all(|w| w[0] == w[1]);
            print_reproducibility(&hashes, identical);
            if identical {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Fingerprints of `runs` independent executions of the same study.
///
/// # Errors
///
/// Returns the first configuration or run error.
pub fn fingerprints(options: &RunOptions, runs: usize) -> DescentResult<Vec<String>> {
    let config = build_config(options)?;
    (0..runs)
        .map(|_| MonteCarloDriver::new(config.clone())?.run()?.fingerprint())
        .collect()
}
