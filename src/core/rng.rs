//! Shared deterministic random source
//!
//! One generator per simulation instance feeds spawning, placement, and
//! tie-breaks. Seeding it from a fixed value makes entire runs replayable;
//! seeding from entropy gives a throwaway run.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::types::Direction;

/// Random number generator shared by all stochastic engine decisions
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: ChaCha8Rng,
}

impl RandomSource {
    /// Deterministic source; identical seeds replay identical runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Non-deterministic source seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Uniform index in `0..bound`
    pub fn next_index(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }

    /// Uniform float in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniformly chosen cardinal direction
    pub fn next_direction(&mut self) -> Direction {
        Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
    }
}
