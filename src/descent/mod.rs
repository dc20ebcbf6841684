//! Terminal-descent trajectory simulator.
//!
//! A single descent starts with the engine firing at a fixed thrust, cuts
//! the engine once the downward speed drops to the cutoff speed, then
//! falls freely to the surface.
//!
//! ```text
//! Braking ──(v <= v_target)──> FreeFall ──(h <= 0)──> Landed
//!    └──────────────────(h <= 0)──────────────────────┘
//! ```

pub mod simulator;
pub mod state;

pub use simulator::{DescentSimulator, StepForcing};
pub use state::{
    DescentState, Phase, TerminationReason, Trajectory, TrajectorySample, TrialInputs,
    TrialResult,
};
