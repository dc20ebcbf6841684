//! Two-phase descent integrator.
//!
//! Explicit Euler on velocity with a semi-implicit altitude update:
//!
//! ```text
//! v[n+1] = max(v[n] + a[n] * dt, 0)
//! h[n+1] = h[n] - v[n+1] * dt
//! ```
//!
//! Global error is O(dt). The step that crosses the surface is
//! interpolated linearly back to `h = 0`, so the reported touchdown speed
//! and time do not depend on how far the fixed step overshoots.

use crate::config::SimulationConfig;
use crate::engine::jidoka::JidokaGuard;
use crate::error::{DescentResult, InvalidTrial};

use super::state::{
    DescentState, Phase, TerminationReason, Trajectory, TrajectorySample, TrialInputs,
    TrialResult,
};

/// Forcing applied over one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepForcing {
    /// Downward acceleration (m/s²).
    pub acceleration: f64,
    /// Proper acceleration felt by the crew (Earth g).
    pub g_load: f64,
}

/// Deterministic descent simulator.
///
/// Holds only the immutable [`SimulationConfig`]; every call is a pure
/// function of its inputs.
///
/// # Example
///
/// ```rust
/// use lunar_descent::config::SimulationConfig;
/// use lunar_descent::descent::{DescentSimulator, TrialInputs};
///
/// let sim = DescentSimulator::new(SimulationConfig::default()).unwrap();
/// let result = sim.simulate(&TrialInputs::new(15_000.0, 1_000.0, 25.0, 72_900.0)).unwrap();
/// assert!(result.touchdown_speed > 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DescentSimulator {
    config: SimulationConfig,
    guard: JidokaGuard,
}

impl DescentSimulator {
    /// Create a simulator after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any constant is out of range.
    pub fn new(config: SimulationConfig) -> DescentResult<Self> {
        config.ensure_valid()?;
        Ok(Self {
            config,
            guard: JidokaGuard::from_config(&config),
        })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Acceleration and crew load for a phase.
    ///
    /// During braking the crew feels thrust only; in free fall they are
    /// weightless.
    #[must_use]
    pub fn forcing(&self, phase: Phase, inputs: &TrialInputs) -> StepForcing {
        match phase {
            Phase::Braking => {
                let thrust_accel = inputs.thrust_acceleration();
                StepForcing {
                    acceleration: self.config.gravity - thrust_accel,
                    g_load: thrust_accel.abs() / self.config.g_earth,
                }
            }
            Phase::FreeFall => StepForcing {
                acceleration: self.config.gravity,
                g_load: 0.0,
            },
            Phase::Landed => StepForcing {
                acceleration: 0.0,
                g_load: 0.0,
            },
        }
    }

    /// Advance the state by one step.
    ///
    /// A landed state is left untouched. On the step that crosses the
    /// surface, velocity and time are interpolated to `h = 0` and the
    /// termination reason is taken from the phase the step started in.
    pub fn step(&self, state: &mut DescentState, inputs: &TrialInputs) -> StepForcing {
        let forcing = self.forcing(state.phase, inputs);
        if state.is_landed() {
            return forcing;
        }

        let dt = self.config.dt;
        state.max_g_load = state.max_g_load.max(forcing.g_load);

        // Clamped so thrust can never push the lander back up.
        let velocity = (state.velocity + forcing.acceleration * dt).max(0.0);
        let altitude = state.altitude - velocity * dt;
        state.steps += 1;

        if altitude <= 0.0 {
            let fraction = state.altitude / (state.altitude - altitude);
            state.velocity += fraction * (velocity - state.velocity);
            state.time += fraction * dt;
            state.altitude = 0.0;
            state.termination = Some(if state.phase.is_powered() {
                TerminationReason::ImpactDuringBraking
            } else {
                TerminationReason::NormalTouchdown
            });
            state.transition(Phase::Landed);
        } else {
            state.velocity = velocity;
            state.altitude = altitude;
            state.time = state.steps as f64 * dt;
            if state.phase.is_powered() && velocity <= self.config.v_target {
                state.cutoff_altitude = Some(altitude);
                state.transition(Phase::FreeFall);
            }
        }

        forcing
    }

    /// Run one descent to touchdown.
    ///
    /// # Errors
    ///
    /// Returns the [`InvalidTrial`] reason if the inputs are non-physical
    /// or the integration trips a Jidoka check.
    pub fn simulate(&self, inputs: &TrialInputs) -> Result<TrialResult, InvalidTrial> {
        self.integrate(inputs, |_| {})
    }

    /// Run one descent and keep the full history.
    ///
    /// # Errors
    ///
    /// Same as [`DescentSimulator::simulate`].
    pub fn simulate_traced(
        &self,
        inputs: &TrialInputs,
    ) -> Result<(TrialResult, Trajectory), InvalidTrial> {
        let mut trajectory = Trajectory::new();
        let result = self.integrate(inputs, |sample| trajectory.push(sample))?;
        Ok((result, trajectory))
    }

    fn integrate<F>(&self, inputs: &TrialInputs, mut observe: F) -> Result<TrialResult, InvalidTrial>
    where
        F: FnMut(TrajectorySample),
    {
        self.guard.check_inputs(inputs)?;

        let mut state = DescentState::initial(inputs);
        while !state.is_landed() {
            let (time, altitude, velocity, phase) =
                (state.time, state.altitude, state.velocity, state.phase);
            let forcing = self.step(&mut state, inputs);
            observe(TrajectorySample {
                time,
                altitude,
                velocity,
                acceleration: forcing.acceleration,
                g_load: forcing.g_load,
                phase,
            });
            self.guard.check_state(&state)?;
        }

        observe(TrajectorySample {
            time: state.time,
            altitude: state.altitude,
            velocity: state.velocity,
            acceleration: 0.0,
            g_load: 0.0,
            phase: state.phase,
        });

        Ok(self.finish(&state))
    }

    fn finish(&self, state: &DescentState) -> TrialResult {
        let touchdown_speed = state.velocity.abs();
        TrialResult {
            touchdown_speed,
            touchdown_time: state.time,
            max_g_load: state.max_g_load,
            safe: self.config.is_safe(touchdown_speed, state.max_g_load),
            termination: state
                .termination
                .unwrap_or(TerminationReason::NormalTouchdown),
            cutoff_altitude: state.cutoff_altitude,
            steps: state.steps,
        }
    }
}
