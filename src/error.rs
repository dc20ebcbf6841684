//! Error types for lunar-descent.
//!
//! Two layers of failure are kept apart:
//! - [`DescentError`]: run-level failures (bad configuration, I/O, an
//!   aborted Monte Carlo run). Raised before any trial runs, or when the
//!   configured policy says a bad sample must stop the run.
//! - [`InvalidTrial`]: a single trial could not be simulated (non-physical
//!   sample, non-finite state, time cap). Recorded by the driver and kept
//!   out of the aggregate statistics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for lunar-descent operations.
pub type DescentResult<T> = Result<T, DescentError>;

/// Unified error type for run-level failures.
#[derive(Debug, Error)]
pub enum DescentError {
    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description naming the violated parameter.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== Run Errors =====
    /// A trial produced a non-physical sample and the run was configured to abort.
    #[error("Trial {trial} is invalid: {reason}")]
    InvalidTrial {
        /// Zero-based trial index.
        trial: usize,
        /// Why the trial could not be simulated.
        reason: InvalidTrial,
    },

    /// Convergence study failure.
    #[error("Convergence error: {0}")]
    Convergence(String),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DescentError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create a convergence error.
    #[must_use]
    pub fn convergence(message: impl Into<String>) -> Self {
        Self::Convergence(message.into())
    }

    /// Check if this error was raised before any trial ran.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::YamlParse(_) | Self::Validation(_)
        )
    }
}

/// Reason a single trial could not be simulated.
///
/// These never abort a run on their own; the driver decides what to do
/// with them according to its [`InvalidSamplePolicy`](crate::config::InvalidSamplePolicy).
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidTrial {
    /// Sampled mass is zero or negative.
    #[error("non-positive mass {mass:.3} kg")]
    NonPositiveMass {
        /// Offending mass (kg).
        mass: f64,
    },

    /// Sampled burn-start altitude is zero or negative.
    #[error("non-positive burn-start altitude {altitude:.3} m")]
    NonPositiveAltitude {
        /// Offending altitude (m).
        altitude: f64,
    },

    /// Sampled burn-start speed points upward.
    #[error("negative burn-start speed {speed:.3} m/s")]
    NegativeSpeed {
        /// Offending speed (m/s, downward positive).
        speed: f64,
    },

    /// Sampled thrust is negative.
    #[error("negative thrust {thrust:.3} N")]
    NegativeThrust {
        /// Offending thrust (N).
        thrust: f64,
    },

    /// NaN or infinity in an input or in the integration state.
    #[error("non-finite value in {field}")]
    NonFinite {
        /// The offending quantity.
        field: Quantity,
    },

    /// Integration ran past the configured time cap without touching down.
    #[error("no touchdown within {time:.1} s")]
    TimeLimitExceeded {
        /// Simulated time when the cap was hit (s).
        time: f64,
    },
}

impl InvalidTrial {
    /// Short stable label, used for grouping in reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NonPositiveMass { .. } => "non_positive_mass",
            Self::NonPositiveAltitude { .. } => "non_positive_altitude",
            Self::NegativeSpeed { .. } => "negative_speed",
            Self::NegativeThrust { .. } => "negative_thrust",
            Self::NonFinite { .. } => "non_finite",
            Self::TimeLimitExceeded { .. } => "time_limit_exceeded",
        }
    }
}

/// Physical quantity named by a [`InvalidTrial::NonFinite`] failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    /// Vehicle mass.
    Mass,
    /// Altitude above the surface.
    Altitude,
    /// Downward velocity.
    Velocity,
    /// Engine thrust.
    Thrust,
    /// Elapsed time.
    Time,
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Mass => "mass",
            Self::Altitude => "altitude",
            Self::Velocity => "velocity",
            Self::Thrust => "thrust",
            Self::Time => "time",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_config() {
        let err = DescentError::config("dt must be positive, got 0");
        assert!(err.is_config_error());
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("dt"));
    }

    #[test]
    fn test_error_serialization() {
        let err = DescentError::serialization("bad json");
        assert!(!err.is_config_error());
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_error_convergence() {
        let err = DescentError::convergence("error grew");
        assert!(err.to_string().contains("Convergence error"));
    }

    #[test]
    fn test_error_invalid_trial_display() {
        let err = DescentError::InvalidTrial {
            trial: 7,
            reason: InvalidTrial::NonPositiveMass { mass: -12.5 },
        };
        assert!(!err.is_config_error());
        let msg = err.to_string();
        assert!(msg.contains("Trial 7"));
        assert!(msg.contains("non-positive mass"));
        assert!(msg.contains("-12.500"));
    }

    #[test]
    fn test_error_io() {
        let err = DescentError::from(std::io::Error::other("missing"));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_invalid_trial_labels_are_distinct() {
        let reasons = [
            InvalidTrial::NonPositiveMass { mass: 0.0 },
            InvalidTrial::NonPositiveAltitude { altitude: 0.0 },
            InvalidTrial::NegativeSpeed { speed: -1.0 },
            InvalidTrial::NegativeThrust { thrust: -1.0 },
            InvalidTrial::NonFinite { field: Quantity::Mass },
            InvalidTrial::TimeLimitExceeded { time: 600.0 },
        ];
        let labels: std::collections::HashSet<_> = reasons.iter().map(InvalidTrial::label).collect();
        assert_eq!(labels.len(), reasons.len());
    }

    #[test]
    fn test_invalid_trial_display() {
        let msg = InvalidTrial::TimeLimitExceeded { time: 600.0 }.to_string();
        assert!(msg.contains("600.0"));
        let msg = InvalidTrial::NonFinite { field: Quantity::Velocity }.to_string();
        assert!(msg.contains("velocity"));
    }

    #[test]
    fn test_invalid_trial_serde_tag() {
        let json = serde_json::to_string(&InvalidTrial::NegativeSpeed { speed: -2.0 }).unwrap_or_default();
        assert!(json.contains("\"kind\":\"negative_speed\""));
    }
}
