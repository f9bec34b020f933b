use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::types::CellState;

// ============================================================================
// RNG
// ============================================================================

/// ChaCha RNG keyed by the SHA-256 of a text phrase, so a board can be
/// replayed from something a player can type.
pub fn rng_from_phrase(phrase: &str) -> ChaCha8Rng {
    let mut hasher = Sha256::new();
    hasher.update(phrase.as_bytes());
    let digest = hasher.finalize();
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    ChaCha8Rng::from_seed(seed)
}

/// Seeded RNG when `seed` is given, OS entropy otherwise.
pub fn rng_from_option(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ============================================================================
// SEED FUNCTIONS
// ============================================================================

/// Each interior cell alive with probability one half.
pub fn uniform<R: Rng>(rng: &mut R) -> impl FnMut(usize, usize) -> CellState + '_ {
    move |_, _| CellState::from(rng.gen_bool(0.5))
}

/// Exactly the listed cells alive.
pub fn from_pattern(alive: &[(usize, usize)]) -> impl FnMut(usize, usize) -> CellState {
    let alive: HashSet<(usize, usize)> = alive.iter().copied().collect();
    move |x, y| CellState::from(alive.contains(&(x, y)))
}

pub fn all_dead(_x: usize, _y: usize) -> CellState {
    CellState::Dead
}
