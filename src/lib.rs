//! # lunar-descent
//!
//! Monte Carlo study of a lunar lander's terminal descent.
//!
//! A deterministic two-phase integrator (constant-thrust braking, then
//! free fall) is driven repeatedly with Gaussian-perturbed inputs to
//! estimate how often a touchdown meets the human-rating limits:
//! - Touchdown speed at most 3 m/s
//! - Crew load at most 5 g
//!
//! Every run is a pure function of its configuration and seed.
//!
//! ## Example
//!
//! ```rust
//! use lunar_descent::prelude::*;
//!
//! let config = StudyConfig::builder()
//!     .trials(100)
//!     .seed(42)
//!     .build();
//! let summary = MonteCarloDriver::new(config)?.run()?;
//! assert_eq!(summary.trials, 100);
//! # Ok::<(), DescentError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
)]

pub mod cli;
pub mod config;
pub mod descent;
pub mod domains;
pub mod engine;
pub mod error;
pub mod verification;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{
        ExecutionStrategy, InvalidSamplePolicy, SamplerConfig, SimulationConfig, StudyConfig,
        StudyConfigBuilder,
    };
    pub use crate::descent::{
        DescentSimulator, Phase, TerminationReason, Trajectory, TrialInputs, TrialResult,
    };
    pub use crate::domains::{MonteCarloDriver, MonteCarloSummary, ParameterSampler};
    pub use crate::engine::jidoka::JidokaGuard;
    pub use crate::engine::rng::SimRng;
    pub use crate::error::{DescentError, DescentResult, InvalidTrial};
    pub use crate::verification::{ConvergenceReport, FreeFallStudy};
}

/// Re-export for public API
pub use error::{DescentError, DescentResult};
