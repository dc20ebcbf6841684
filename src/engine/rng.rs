//! Deterministic random number generation.
//!
//! Implements PCG (Permuted Congruential Generator) as an explicit stream
//! object. One stream is created per Monte Carlo run and threaded by
//! `&mut` into the sampler; nothing in the crate holds a global generator.
//!
//! # Reproducibility Guarantee
//!
//! Given the same master seed, all random number sequences will be
//! bitwise-identical across:
//! - Different runs
//! - Different platforms
//! - Different thread counts (a worker starting at trial `s` jumps the
//!   master stream forward to the first draw of trial `s`, so every trial
//!   sees the same variates it would see in a sequential run)

use rand::prelude::*;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// Deterministic, reproducible random number generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimRng {
    /// Master seed for reproducibility.
    master_seed: u64,
    /// Position in the master stream, in uniform draws.
    draws: u64,
    /// Internal PCG state.
    rng: Pcg64,
}

impl SimRng {
    /// Create a new RNG with the given master seed.
    #[must_use]
    pub fn new(master_seed: u64) -> Self {
        Self {
            master_seed,
            draws: 0,
            rng: Pcg64::seed_from_u64(master_seed),
        }
    }

    /// Create the master stream positioned `draw` uniforms in.
    ///
    /// Each uniform consumes one PCG step, so jumping ahead is O(log n)
    /// and yields exactly the variates a sequential consumer would see
    /// after `draw` calls to [`SimRng::gen_f64`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use lunar_descent::engine::rng::SimRng;
    ///
    /// let mut a = SimRng::new(42);
    /// for _ in 0..16 {
    ///     a.gen_f64();
    /// }
    /// let mut b = SimRng::at_draw(42, 16);
    /// assert_eq!(a.gen_f64().to_bits(), b.gen_f64().to_bits());
    /// ```
    #[must_use]
    pub fn at_draw(master_seed: u64, draw: u64) -> Self {
        let mut stream = Self::new(master_seed);
        stream.rng.advance(u128::from(draw));
        stream.draws = draw;
        stream
    }

    /// Get the master seed.
    #[must_use]
    pub const fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Position in the master stream, in uniform draws.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    /// Generate a random f64 in [0, 1).
    pub fn gen_f64(&mut self) -> f64 {
        self.draws += 1;
        self.rng.gen()
    }

    /// Generate a standard normal sample using Box-Muller transform.
    ///
    /// Always consumes exactly two uniform draws.
    pub fn gen_standard_normal(&mut self) -> f64 {
        let u1 = self.gen_f64();
        let u2 = self.gen_f64();

        // Avoid log(0)
        let u1 = if u1 < f64::EPSILON { f64::EPSILON } else { u1 };

        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Generate a normal sample with given mean and std.
    pub fn gen_normal(&mut self, mean: f64, std: f64) -> f64 {
        mean + std * self.gen_standard_normal()
    }
}
