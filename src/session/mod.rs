//! Game sessions: board state, mana, and turn processing.
//!
//! Exactly one turn per session is processed at a time. Independent
//! sessions share nothing mutable except the piece id generator and the
//! configuration provider's cache.

pub mod mana;
pub mod board;
pub mod game;

pub use board::Board;
pub use game::{GameSession, TurnPhase, TurnSummary};
pub use mana::{ManaLedger, ManaPools};
