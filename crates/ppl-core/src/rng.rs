//! Deterministic RNG wrapper used when drawing from enumerated results.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic RNG handle.
///
/// Thin wrapper around `StdRng`; the same seed always yields the same draws
/// on every platform, which keeps sampling from a marginal reproducible.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a new RNG handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws a uniform value in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}
