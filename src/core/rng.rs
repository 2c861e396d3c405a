//! Seeded randomness for AI tie-breaking.
//!
//! The rules never draw random numbers. The AI shuffles equally scored
//! candidates before a stable sort, and that shuffle must replay exactly:
//! one stream per (seed, team, turn).
//!
//! ```
//! use tactics_engine::core::{GameRng, TeamId};
//!
//! let mut a = GameRng::new(42).for_turn(TeamId::new(1), 3);
//! let mut b = GameRng::new(42).for_turn(TeamId::new(1), 3);
//!
//! let mut xs = vec![1, 2, 3, 4, 5];
//! let mut ys = xs.clone();
//! a.shuffle(&mut xs);
//! b.shuffle(&mut ys);
//! assert_eq!(xs, ys);
//! ```

use std::hash::{Hash, Hasher};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;

use super::player::TeamId;

/// Seeded RNG with derived per-turn streams.
///
/// ChaCha8 keeps sequences identical across platforms.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create an RNG from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The stream for `team`'s turn `turn`.
    ///
    /// Derived from this RNG's seed only, never from its position, so the
    /// same seed always yields the same stream for the same turn.
    #[must_use]
    pub fn for_turn(&self, team: TeamId, turn: u32) -> Self {
        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        team.hash(&mut hasher);
        turn.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// The seed this stream was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }
}
