//! CLI module for lunar-descent.
//!
//! All CLI logic lives here rather than in `main.rs` so it can be tested.
//! The entry point `run_cli` is called from `main.rs` with parsed
//! arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command, RunOptions, DEFAULT_REPRODUCE_RUNS};
pub use commands::{build_config, fingerprints, reproduce, run_cli, run_study, verify_convergence};
pub use output::{
    format_convergence_report, format_reproducibility, format_summary, print_convergence_report,
    print_help, print_reproducibility, print_summary, print_version,
};
