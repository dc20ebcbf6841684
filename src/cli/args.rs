//! CLI argument parsing.
//!
//! Hand-rolled parser over any iterator of strings, so every branch can be
//! exercised from unit tests without touching `std::env`.

use std::path::PathBuf;
use std::str::FromStr;

/// Default number of repeated runs for `reproduce`.
pub const DEFAULT_REPRODUCE_RUNS: usize = 3;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Study overrides shared by `run` and `reproduce`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Number of trials (`--samples`).
    pub samples: Option<usize>,
    /// Mean burn-start speed (`--speed-mean`).
    pub speed_mean: Option<f64>,
    /// Thrust multiplier (`--thrust-multiplier`).
    pub thrust_multiplier: Option<f64>,
    /// Master seed (`--seed`).
    pub seed: Option<u64>,
    /// YAML study file (`--config`); overrides are applied on top.
    pub config_path: Option<PathBuf>,
    /// Partition the run across this many workers (`--workers`).
    pub workers: Option<usize>,
    /// Emit JSON instead of the text report.
    pub json: bool,
    /// Debug-level logging.
    pub verbose: bool,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Run a Monte Carlo study.
    Run(RunOptions),
    /// Run the free-fall convergence study.
    Verify {
        /// Emit JSON instead of the table.
        json: bool,
        /// Debug-level logging.
        verbose: bool,
    },
    /// Run a study several times and compare summary fingerprints.
    Reproduce {
        /// Study options.
        options: RunOptions,
        /// Number of runs.
        runs: usize,
    },
    /// Show help
    Help,
    /// Show version
    Version,
    /// The command line could not be parsed.
    Invalid {
        /// What was wrong.
        message: String,
    },
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// The first item is the program name.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    /// Whether debug logging was requested.
    #[must_use]
    pub fn verbose(&self) -> bool {
        match &self.command {
            Command::Run(options) | Command::Reproduce { options, .. } => options.verbose,
            Command::Verify { verbose, .. } => *verbose,
            Command::Help | Command::Version | Command::Invalid { .. } => false,
        }
    }

    fn parse_from_vec(args: &[String]) -> Self {
        let Some(name) = args.get(1) else {
            return Self {
                command: Command::Help,
            };
        };
        let rest = &args[2..];

        let command = match name.as_str() {
            "run" => parse_run_options(rest).map_or_else(invalid, Command::Run),
            "verify" => parse_verify(rest).unwrap_or_else(invalid),
            "reproduce" => parse_reproduce(rest).unwrap_or_else(invalid),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => invalid(format!("unknown command '{unknown}'")),
        };

        Self { command }
    }
}

fn invalid(message: String) -> Command {
    Command::Invalid { message }
}

fn parse_run_options(args: &[String]) -> Result<RunOptions, String> {
    let mut options = RunOptions::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        if !apply_run_flag(&mut options, flag, &mut iter)? {
            return Err(format!("unexpected argument '{flag}'"));
        }
    }
    Ok(options)
}

/// Apply one `run` flag. Returns `false` if the flag is not a run flag.
fn apply_run_flag<'a, I>(options: &mut RunOptions, flag: &str, iter: &mut I) -> Result<bool, String>
where
    I: Iterator<Item = &'a String>,
{
    match flag {
        "-n" | "--samples" => options.samples = Some(value(flag, iter)?),
        "--speed-mean" => options.speed_mean = Some(value(flag, iter)?),
        "--thrust-multiplier" => options.thrust_multiplier = Some(value(flag, iter)?),
        "--seed" => options.seed = Some(value(flag, iter)?),
        "--workers" => options.workers = Some(value(flag, iter)?),
        "-c" | "--config" => options.config_path = Some(PathBuf::from(raw(flag, iter)?)),
        "--json" => options.json = true,
        "-v" | "--verbose" => options.verbose = true,
        _ => return Ok(false),
    }
    Ok(true)
}

fn parse_verify(args: &[String]) -> Result<Command, String> {
    let mut json = false;
    let mut verbose = false;
    for flag in args {
        match flag.as_str() {
            "--json" => json = true,
            "-v" | "--verbose" => verbose = true,
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }
    Ok(Command::Verify { json, verbose })
}

fn parse_reproduce(args: &[String]) -> Result<Command, String> {
    let mut options = RunOptions::default();
    let mut runs = DEFAULT_REPRODUCE_RUNS;
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        if flag == "--runs" {
            runs = value(flag, &mut iter)?;
            if runs < 2 {
                return Err(format!("--runs must be at least 2, got {runs}"));
            }
        } else if !apply_run_flag(&mut options, flag, &mut iter)? {
            return Err(format!("unexpected argument '{flag}'"));
        }
    }
    Ok(Command::Reproduce { options, runs })
}

fn raw<'a, I>(flag: &str, iter: &mut I) -> Result<&'a String, String>
where
    I: Iterator<Item = &'a String>,
{
    iter.next().ok_or_else(|| format!("{flag} requires a value"))
}

fn value<'a, T, I>(flag: &str, iter: &mut I) -> Result<T, String>
where
    T: FromStr,
    I: Iterator<Item = &'a String>,
{
    let text = raw(flag, iter)?;
    text.parse()
        .map_err(|_| format!("invalid value '{text}' for {flag}"))
}
