//! Uniform piece randomizer
//!
//! Every draw picks one of the 7 tetrominoes with equal probability,
//! independently of previous draws.

use crate::tetromino::TetrominoType;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform random piece source
#[derive(Debug, Clone)]
pub struct Randomizer {
    rng: ChaCha8Rng,
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Randomizer {
    /// Create a randomizer seeded from the OS
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Create a randomizer with a fixed seed (reproducible sequences)
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draw the next piece
    pub fn next(&mut self) -> TetrominoType {
        let pieces = TetrominoType::all();
        pieces[self.rng.gen_range(0..pieces.len())]
    }
}
