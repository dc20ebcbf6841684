//! Jidoka (自働化) - Autonomous anomaly detection.
//!
//! Implements Toyota's Jidoka principle for a single descent: the guard
//! inspects the sampled inputs before the first step and the state after
//! every step, and stops the trial the moment something is non-physical.
//!
//! # Anomaly Types
//!
//! 1. **Non-physical inputs**: non-positive mass or altitude, upward
//!    speed, negative thrust (reachable through untruncated Gaussian tails)
//! 2. **Non-finite values**: NaN or Inf in any input or state variable
//! 3. **Time cap**: no touchdown within the configured simulated time
//!
//! A stop here only ends the current trial. The Monte Carlo driver decides
//! whether the run continues.

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::descent::{DescentState, TrialInputs};
use crate::error::{InvalidTrial, Quantity};

/// Jidoka guard configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JidokaConfig {
    /// NaN/Inf detection enabled.
    pub check_finite: bool,
    /// Maximum simulated time per trial (s).
    pub max_time: f64,
}

impl Default for JidokaConfig {
    fn default() -> Self {
        Self {
            check_finite: true,
            max_time: SimulationConfig::default().max_time,
        }
    }
}

impl From<&SimulationConfig> for JidokaConfig {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            check_finite: true,
            max_time: config.max_time,
        }
    }
}

/// Jidoka guard for per-trial anomaly detection.
///
/// # Example
///
/// ```rust
/// use lunar_descent::descent::TrialInputs;
/// use lunar_descent::engine::jidoka::{JidokaConfig, JidokaGuard};
///
/// let guard = JidokaGuard::new(JidokaConfig::default());
/// let inputs = TrialInputs::new(-10.0, 1_000.0, 25.0, 72_900.0);
///
/// assert!(guard.check_inputs(&inputs).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct JidokaGuard {
    config: JidokaConfig,
}

impl JidokaGuard {
    /// Create a new Jidoka guard with given configuration.
    #[must_use]
    pub const fn new(config: JidokaConfig) -> Self {
        Self { config }
    }

    /// Create from simulation configuration.
    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(JidokaConfig::from(config))
    }

    /// Get current configuration.
    #[must_use]
    pub const fn config(&self) -> &JidokaConfig {
        &self.config
    }

    /// Inspect a sampled input vector before integration.
    ///
    /// # Errors
    ///
    /// Returns the first non-physical quantity found, checked in sampling
    /// order (mass, altitude, speed, thrust).
    pub fn check_inputs(&self, inputs: &TrialInputs) -> Result<(), InvalidTrial> {
        if self.config.check_finite {
            check_finite(Quantity::Mass, inputs.mass)?;
            check_finite(Quantity::Altitude, inputs.altitude)?;
            check_finite(Quantity::Velocity, inputs.speed)?;
            check_finite(Quantity::Thrust, inputs.thrust)?;
        }

        if inputs.mass <= 0.0 {
            return Err(InvalidTrial::NonPositiveMass { mass: inputs.mass });
        }
        if inputs.altitude <= 0.0 {
            return Err(InvalidTrial::NonPositiveAltitude {
                altitude: inputs.altitude,
            });
        }
        if inputs.speed < 0.0 {
            return Err(InvalidTrial::NegativeSpeed {
                speed: inputs.speed,
            });
        }
        if inputs.thrust < 0.0 {
            return Err(InvalidTrial::NegativeThrust {
                thrust: inputs.thrust,
            });
        }

        Ok(())
    }

    /// Inspect the state after a step.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTrial::NonFinite`] or [`InvalidTrial::TimeLimitExceeded`].
    pub fn check_state(&self, state: &DescentState) -> Result<(), InvalidTrial> {
        if self.config.check_finite {
            check_finite(Quantity::Altitude, state.altitude)?;
            check_finite(Quantity::Velocity, state.velocity)?;
            check_finite(Quantity::Time, state.time)?;
        }

        if !state.is_landed() && state.time >= self.config.max_time {
            return Err(InvalidTrial::TimeLimitExceeded { time: state.time });
        }

        Ok(())
    }
}

fn check_finite(field: Quantity, value: f64) -> Result<(), InvalidTrial> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InvalidTrial::NonFinite { field })
    }
}
