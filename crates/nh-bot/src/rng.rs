//! Random number generation for the agent
//!
//! Uses a seeded ChaCha RNG so that runs are reproducible. The agent's stream
//! only breaks ties in neighbour ordering; it never decides strategy.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Agent random number generator
#[derive(Debug, Clone)]
pub struct BotRng {
    rng: ChaCha8Rng,
}

impl BotRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Returns 0..n-1, or 0 if n is 0
    pub fn rn2(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Returns 1..=n, or 1 if n is 0
    pub fn rnd(&mut self, n: u32) -> u32 {
        self.rn2(n) + 1
    }

    /// Check a one-in-`n` chance
    pub fn one_in(&mut self, n: u32) -> bool {
        self.rn2(n) == 0
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rn2(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }
}
