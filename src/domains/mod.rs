//! Stochastic study layer.
//!
//! - Sampler: Gaussian per-trial inputs drawn from an explicit stream
//! - Monte Carlo: trial orchestration, invalid-sample policy, summary statistics

pub mod monte_carlo;
pub mod sampler;

pub use monte_carlo::{
    FieldStats, InvalidTrialRecord, MonteCarloDriver, MonteCarloSummary, SummaryAccumulator,
    TerminationCounts,
};
pub use sampler::{ParameterSampler, DRAWS_PER_SAMPLE};
