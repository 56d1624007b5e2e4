//! Pseudo-random key source

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Supplies the 16-bit random draws mixed into each key.
pub trait KeySource {
    /// Next 16-bit value.
    fn next_u16(&mut self) -> u16;
}

/// Seeded source backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    /// Source with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl KeySource for SeededSource {
    #[inline]
    fn next_u16(&mut self) -> u16 {
        (self.rng.next_u32() >> 16) as u16
    }
}
