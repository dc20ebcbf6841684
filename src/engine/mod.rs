//! Simulation engine primitives.
//!
//! - Deterministic RNG (PCG with offset streams for partitioned runs)
//! - Jidoka guards for stop-on-anomaly inside a single trial

pub mod jidoka;
pub mod rng;

pub use jidoka::{JidokaConfig, JidokaGuard};
pub use rng::SimRng;
