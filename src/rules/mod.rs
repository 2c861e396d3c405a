//! Game rules: legality checks and state mutation.
//!
//! The leaf modules are plain functions over pieces, the board and a
//! [`BalanceConfig`](crate::config::BalanceConfig):
//! - `movement`: move and basic-attack legality
//! - `ability`: ability legality, mana, cooldowns, AoE damage
//! - `shield`: king and neighbour shield regeneration
//! - `evolution`: threshold-driven type changes with XP carry-forward
//!
//! [`Rules`] composes them into the one path every actor goes through.

pub mod movement;
pub mod ability;
pub mod shield;
pub mod evolution;
pub mod engine;

pub use ability::Hit;
pub use engine::{ActionFilter, ActionOutcome, AllowAll, GameResult, Rules, TickOutcome};
pub use evolution::Evolution;
