//! Free-fall convergence study.
//!
//! With zero thrust the descent reduces to `dv/dt = g`, `dh/dt = -v`, whose
//! exact solution from rest is `h(t) = h0 - g t² / 2`. The integrator is
//! run unmodified (thrust 0, so braking is gravity-only) at a ladder of
//! step sizes, and the maximum altitude error over a fixed horizon is
//! compared against it.
//!
//! For the semi-implicit Euler scheme the error at step `n` is exactly
//! `g t dt / 2`, so halving `dt` halves the error and the observed order
//! is 1.

use serde::{Deserialize, Serialize};

use crate::config::{SimulationConfig, LUNAR_GRAVITY};
use crate::descent::{DescentSimulator, TrialInputs};
use crate::error::{DescentError, DescentResult};

/// Slack on sample times when comparing against the horizon.
const TIME_EPSILON: f64 = 1e-9;

/// Mass used for the unpowered runs. Any positive value gives the same
/// trajectory.
const REFERENCE_MASS: f64 = 15_000.0;

/// Free-fall study parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeFallStudy {
    /// Initial altitude (m).
    pub altitude: f64,
    /// Gravity (m/s²).
    pub gravity: f64,
    /// Comparison horizon (s).
    pub horizon: f64,
    /// Step sizes, coarse to fine (s).
    pub timesteps: Vec<f64>,
}

impl Default for FreeFallStudy {
    fn default() -> Self {
        Self {
            altitude: 1_000.0,
            gravity: LUNAR_GRAVITY,
            horizon: 4.0,
            timesteps: vec![0.4, 0.2, 0.1, 0.05],
        }
    }
}

/// One row of the convergence table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceRow {
    /// Step size (s).
    pub dt: f64,
    /// Maximum `|h_num - h_exact|` over the horizon (m).
    pub max_error: f64,
    /// Order estimated against the previous row.
    pub order: Option<f64>,
}

/// Result of a [`FreeFallStudy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceReport {
    /// Study that produced this report.
    pub study: FreeFallStudy,
    /// One row per step size, in study order.
    pub rows: Vec<ConvergenceRow>,
    /// Least-squares slope of `log(error)` against `log(dt)`.
    pub observed_order: f64,
}

impl ConvergenceReport {
    /// Check that the observed order is within `tolerance` of 1.
    ///
    /// # Errors
    ///
    /// Returns [`DescentError::Convergence`] otherwise.
    pub fn check_first_order(&self, tolerance: f64) -> DescentResult<()> {
        if (self.observed_order - 1.0).abs() <= tolerance {
            Ok(())
        } else {
            Err(DescentError::convergence(format!(
                "observed order {:.3} is not within {tolerance} of 1",
                self.observed_order
            )))
        }
    }
}

impl FreeFallStudy {
    /// Exact altitude at time `t`.
    #[must_use]
    pub fn exact_altitude(&self, t: f64) -> f64 {
        self.altitude - 0.5 * self.gravity * t * t
    }

    /// Run the study.
    ///
    /// # Errors
    ///
    /// Returns [`DescentError::Convergence`] if fewer than two step sizes
    /// are given, the horizon is not positive, or a run fails. Step sizes
    /// are validated like any simulation timestep.
    pub fn run(&self) -> DescentResult<ConvergenceReport> {
        if self.timesteps.len() < 2 {
            return Err(DescentError::convergence(
                "at least two step sizes are required",
            ));
        }
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(DescentError::convergence(format!(
                "horizon must be positive, got {}",
                self.horizon
            )));
        }

        let mut rows: Vec<ConvergenceRow> = Vec::with_capacity(self.timesteps.len());
        for &dt in &self.timesteps {
            let max_error = self.max_error(dt)?;
            let order = rows
                .last()
                .map(|prev| (prev.max_error / max_error).ln() / (prev.dt / dt).ln());
            rows.push(ConvergenceRow {
                dt,
                max_error,
                order,
            });
        }

        let observed_order = fit_slope(&rows);
        if !observed_order.is_finite() {
            return Err(DescentError::convergence(
                "errors vanished or step sizes repeat; order is undefined",
            ));
        }

        Ok(ConvergenceReport {
            study: self.clone(),
            rows,
            observed_order,
        })
    }

    fn max_error(&self, dt: f64) -> DescentResult<f64> {
        let sim = DescentSimulator::new(SimulationConfig {
            gravity: self.gravity,
            dt,
            ..SimulationConfig::default()
        })?;
        let inputs = TrialInputs::new(REFERENCE_MASS, self.altitude, 0.0, 0.0);
        let (_, trajectory) = sim
            .simulate_traced(&inputs)
            .map_err(|reason| DescentError::convergence(format!("dt = {dt}: {reason}")))?;

        Ok(trajectory
            .samples()
            .iter()
            .take_while(|s| s.time <= self.horizon + TIME_EPSILON)
            .map(|s| (s.altitude - self.exact_altitude(s.time)).abs())
            .fold(0.0, f64::max))
    }
}

fn fit_slope(rows: &[ConvergenceRow]) -> f64 {
    let n = rows.len() as f64;
    let xs: Vec<f64> = rows.iter().map(|r| r.dt.ln()).collect();
    let ys: Vec<f64> = rows.iter().map(|r| r.max_error.ln()).collect();
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let sxy: f64 = xs.iter().zip(&ys).map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    sxy / sxx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ConvergenceReport {
        FreeFallStudy::default()
            .run()
            .unwrap_or_else(|e| panic!("study failed: {e}"))
    }

    #[test]
    fn test_error_matches_closed_form() {
        // Error at t is g t dt / 2, largest at the horizon.
        for row in report().rows {
            let expected = 0.5 * LUNAR_GRAVITY * 4.0 * row.dt;
            assert!(
                (row.max_error - expected).abs() < 1e-6,
                "dt {}: {} vs {expected}",
                row.dt,
                row.max_error
            );
        }
    }

    #[test]
    fn test_halving_dt_halves_error() {
        let report = report();
        assert_eq!(report.rows.len(), 4);
        assert!(report.rows[0].order.is_none());
        for pair in report.rows.windows(2) {
            let ratio = pair[0].max_error / pair[1].max_error;
            assert!((ratio - 2.0).abs() < 0.05, "ratio {ratio}");
            let order = pair[1].order.unwrap_or(f64::NAN);
            assert!((order - 1.0).abs() < 0.05, "order {order}");
        }
    }

    #[test]
    fn test_observed_order_is_one() {
        let report = report();
        assert!((report.observed_order - 1.0).abs() < 0.05);
        assert!(report.check_first_order(0.1).is_ok());
    }

    #[test]
    fn test_check_first_order_rejects() {
        let mut report = report();
        report.observed_order = 2.0;
        assert!(matches!(
            report.check_first_order(0.1),
            Err(DescentError::Convergence(_))
        ));
    }

    #[test]
    fn test_requires_two_steps() {
        let study = FreeFallStudy {
            timesteps: vec![0.1],
            ..FreeFallStudy::default()
        };
        assert!(matches!(study.run(), Err(DescentError::Convergence(_))));
    }

    #[test]
    fn test_invalid_timestep_is_config_error() {
        let study = FreeFallStudy {
            timesteps: vec![0.1, 0.0],
            ..FreeFallStudy::default()
        };
        assert!(study.run().err().is_some_and(|e| e.is_config_error()));
    }

    #[test]
    fn test_exact_altitude() {
        let study = FreeFallStudy::default();
        assert!((study.exact_altitude(0.0) - 1_000.0).abs() < f64::EPSILON);
        assert!((study.exact_altitude(10.0) - 919.0).abs() < 1e-9);
    }
}
