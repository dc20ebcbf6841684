//! Descent state, trial inputs and trial outcomes.
//!
//! Sign convention: altitude is positive upward, velocity is positive
//! downward, so `dh/dt = -v` and `dv/dt = g - T/m`.

use serde::{Deserialize, Serialize};

/// Descent phase.
///
/// Phases only move forward: `Braking -> FreeFall -> Landed`, or
/// `Braking -> Landed` when the surface is reached mid-burn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Powered descent, constant thrust opposing gravity.
    Braking,
    /// Engine off, gravity only.
    FreeFall,
    /// Terminal.
    Landed,
}

impl Phase {
    /// Whether `self -> next` is a legal forward transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Braking, Self::FreeFall | Self::Landed) | (Self::FreeFall, Self::Landed)
        )
    }

    /// Whether this phase ends the integration.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Landed)
    }

    /// Whether the engine fires during this phase.
    #[must_use]
    pub const fn is_powered(self) -> bool {
        matches!(self, Self::Braking)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Braking => "braking",
            Self::FreeFall => "free-fall",
            Self::Landed => "landed",
        };
        f.write_str(name)
    }
}

/// One Monte Carlo sample: the randomized inputs of a single descent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialInputs {
    /// Vehicle mass (kg).
    pub mass: f64,
    /// Altitude at burn start (m).
    pub altitude: f64,
    /// Downward speed at burn start (m/s).
    pub speed: f64,
    /// Braking thrust magnitude (N).
    pub thrust: f64,
}

impl TrialInputs {
    /// Create a new input vector.
    #[must_use]
    pub const fn new(mass: f64, altitude: f64, speed: f64, thrust: f64) -> Self {
        Self {
            mass,
            altitude,
            speed,
            thrust,
        }
    }

    /// Thrust-only acceleration magnitude (m/s²).
    #[must_use]
    pub fn thrust_acceleration(&self) -> f64 {
        self.thrust / self.mass
    }
}

/// How a descent ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Touchdown after the braking burn was cut.
    NormalTouchdown,
    /// Surface reached while the engine was still firing.
    ImpactDuringBraking,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NormalTouchdown => "normal touchdown",
            Self::ImpactDuringBraking => "impact during braking",
        };
        f.write_str(name)
    }
}

/// Mutable integration state of one descent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescentState {
    /// Elapsed time (s). Interpolated to the surface crossing once landed.
    pub time: f64,
    /// Altitude above the surface (m).
    pub altitude: f64,
    /// Downward velocity (m/s).
    pub velocity: f64,
    /// Current phase.
    pub phase: Phase,
    /// Integration steps taken.
    pub steps: u64,
    /// Running maximum crew load (Earth g).
    pub max_g_load: f64,
    /// Altitude at which the burn was cut, if it was.
    pub cutoff_altitude: Option<f64>,
    /// Set when the state reaches [`Phase::Landed`].
    pub termination: Option<TerminationReason>,
}

impl DescentState {
    /// State at burn start.
    #[must_use]
    pub const fn initial(inputs: &TrialInputs) -> Self {
        Self {
            time: 0.0,
            altitude: inputs.altitude,
            velocity: inputs.speed,
            phase: Phase::Braking,
            steps: 0,
            max_g_load: 0.0,
            cutoff_altitude: None,
            termination: None,
        }
    }

    /// Whether integration is finished.
    #[must_use]
    pub const fn is_landed(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Advance to `next`. Illegal transitions are ignored and reported as `false`.
    pub(crate) fn transition(&mut self, next: Phase) -> bool {
        if self.phase.can_transition_to(next) {
            self.phase = next;
            true
        } else {
            false
        }
    }
}

/// Immutable outcome of one descent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Downward speed at the surface crossing (m/s).
    pub touchdown_speed: f64,
    /// Time of the surface crossing (s).
    pub touchdown_time: f64,
    /// Maximum crew load experienced (Earth g).
    pub max_g_load: f64,
    /// Both human-rating limits satisfied.
    pub safe: bool,
    /// How the descent ended.
    pub termination: TerminationReason,
    /// Altitude at engine cutoff, `None` for an impact during braking.
    pub cutoff_altitude: Option<f64>,
    /// Integration steps taken.
    pub steps: u64,
}

/// One recorded point of a trajectory.
///
/// Samples are taken before each step, carrying the acceleration and
/// load applied during that step; the last sample is the touchdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    /// Time (s).
    pub time: f64,
    /// Altitude (m).
    pub altitude: f64,
    /// Downward velocity (m/s).
    pub velocity: f64,
    /// Downward acceleration applied over the next step (m/s²).
    pub acceleration: f64,
    /// Crew load over the next step (Earth g).
    pub g_load: f64,
    /// Phase at this sample.
    pub phase: Phase,
}

/// Full history of one descent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
}

impl Trajectory {
    /// Create an empty trajectory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, sample: TrajectorySample) {
        self.samples.push(sample);
    }

    /// All samples in time order.
    #[must_use]
    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Touchdown sample.
    #[must_use]
    pub fn last(&self) -> Option<&TrajectorySample> {
        self.samples.last()
    }

    /// Distinct phases in the order they were visited.
    #[must_use]
    pub fn phases(&self) -> Vec<Phase> {
        let mut phases: Vec<Phase> = self.samples.iter().map(|s| s.phase).collect();
        phases.dedup();
        phases
    }

    /// Times of the recorded samples.
    #[must_use]
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Altitudes of the recorded samples.
    #[must_use]
    pub fn altitudes(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.altitude).collect()
    }

    /// Velocities of the recorded samples.
    #[must_use]
    pub fn velocities(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.velocity).collect()
    }

    /// Crew loads of the recorded samples.
    #[must_use]
    pub fn g_loads(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.g_load).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions_forward_only() {
        assert!(Phase::Braking.can_transition_to(Phase::FreeFall));
        assert!(Phase::Braking.can_transition_to(Phase::Landed));
        assert!(Phase::FreeFall.can_transition_to(Phase::Landed));

        assert!(!Phase::FreeFall.can_transition_to(Phase::Braking));
        assert!(!Phase::Landed.can_transition_to(Phase::Braking));
        assert!(!Phase::Landed.can_transition_to(Phase::FreeFall));
        assert!(!Phase::Braking.can_transition_to(Phase::Braking));
    }

    #[test]
    fn test_phase_ordering_matches_transitions() {
        assert!(Phase::Braking < Phase::FreeFall);
        assert!(Phase::FreeFall < Phase::Landed);
    }

    #[test]
    fn test_phase_flags() {
        assert!(Phase::Braking.is_powered());
        assert!(!Phase::FreeFall.is_powered());
        assert!(Phase::Landed.is_terminal());
        assert!(!Phase::FreeFall.is_terminal());
    }

    #[test]
    fn test_state_rejects_backward_transition() {
        let inputs = TrialInputs::new(15_000.0, 1_000.0, 25.0, 72_900.0);
        let mut state = DescentState::initial(&inputs);
        assert!(state.transition(Phase::FreeFall));
        assert!(!state.transition(Phase::Braking));
        assert_eq!(state.phase, Phase::FreeFall);
        assert!(state.transition(Phase::Landed));
        assert!(state.is_landed());
        assert!(!state.transition(Phase::FreeFall));
    }

    #[test]
    fn test_initial_state() {
        let inputs = TrialInputs::new(15_000.0, 1_000.0, 25.0, 72_900.0);
        let state = DescentState::initial(&inputs);
        assert_eq!(state.phase, Phase::Braking);
        assert!((state.altitude - 1_000.0).abs() < f64::EPSILON);
        assert!((state.velocity - 25.0).abs() < f64::EPSILON);
        assert!(state.time.abs() < f64::EPSILON);
        assert!(state.max_g_load.abs() < f64::EPSILON);
        assert!(state.termination.is_none());
    }

    #[test]
    fn test_thrust_acceleration() {
        let inputs = TrialInputs::new(15_000.0, 1_000.0, 25.0, 72_900.0);
        assert!((inputs.thrust_acceleration() - 4.86).abs() < 1e-12);
    }

    #[test]
    fn test_trajectory_phases_dedup() {
        let mut traj = Trajectory::new();
        for phase in [Phase::Braking, Phase::Braking, Phase::FreeFall, Phase::Landed] {
            traj.push(TrajectorySample {
                time: 0.0,
                altitude: 1.0,
                velocity: 0.0,
                acceleration: 0.0,
                g_load: 0.0,
                phase,
            });
        }
        assert_eq!(traj.len(), 4);
        assert_eq!(traj.phases(), vec![Phase::Braking, Phase::FreeFall, Phase::Landed]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Phase::FreeFall.to_string(), "free-fall");
        assert_eq!(
            TerminationReason::ImpactDuringBraking.to_string(),
            "impact during braking"
        );
    }
}
