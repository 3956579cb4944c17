//! Deterministic random number generation threaded through game state.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical sequence
//! - **Explicit**: The RNG never lives in a global. `GameState` carries a
//!   `GameRngState`; mutators that need randomness restore a `GameRng` from
//!   it, draw, and store the advanced state in the snapshot they return.
//!
//! ## Usage
//!
//! ```
//! use rust_tabletop::core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//! let saved = rng.state();
//! let first = rng.roll(6);
//!
//! // Restoring replays the same roll
//! let mut replay = GameRng::from_state(&saved);
//! assert_eq!(replay.roll(6), first);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG.
///
/// Uses ChaCha8 for speed; its word position makes state capture O(1)
/// regardless of how many numbers were drawn.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Roll one die with `sides` faces, returning `1..=sides`.
    ///
    /// A die with fewer than one side always shows 1.
    pub fn roll(&mut self, sides: u32) -> i64 {
        let sides = i64::from(sides.max(1));
        self.inner.gen_range(1..=sides)
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Get the current state for storing in a snapshot.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state stored in `GameState`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}

impl GameRngState {
    /// Initial state for a seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        GameRng::new(seed).state()
    }
}
