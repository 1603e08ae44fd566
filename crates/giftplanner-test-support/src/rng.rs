//! Deterministic `DeterministicRng` implementations for tests.

use giftplanner_core::rng::DeterministicRng;

/// An RNG that always draws index 0. Suitable for tests that do not depend on
/// specific random values.
#[derive(Debug, Default)]
pub struct FirstIndexRng;

impl DeterministicRng for FirstIndexRng {
    fn next_index(&mut self, _upper: usize) -> usize {
        0
    }
}

/// An RNG that returns values from a predetermined sequence, each reduced
/// modulo the requested bound. Panics if the sequence is exhausted. Used in
/// tests that need a specific, hand-computed raffle outcome.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<usize>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<usize>) -> Self {
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_index(&mut self, upper: usize) -> usize {
        let val = self.values[self.index];
        self.index += 1;
        val % upper
    }
}
