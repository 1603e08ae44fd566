//! Random number generator abstraction.
//!
//! In production this wraps a `rand` generator seeded from the OS. Tests
//! inject a seeded or scripted implementation so raffle assignments can be
//! reproduced.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Returns a uniformly distributed index in `[0, upper)`.
    ///
    /// Callers must pass a non-zero `upper`.
    fn next_index(&mut self, upper: usize) -> usize;
}

/// [`DeterministicRng`] backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct StdRandom(StdRng);

impl StdRandom {
    /// Creates a generator seeded from operating-system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Creates a reproducible generator from a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl DeterministicRng for StdRandom {
    fn next_index(&mut self, upper: usize) -> usize {
        self.0.random_range(0..upper)
    }
}
