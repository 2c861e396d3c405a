//! AI turn selection.
//!
//! Deterministic, rule-driven play for AI-controlled teams. The AI has no
//! private rules path: it enumerates and executes actions through the same
//! [`Rules`](crate::rules::Rules) the human side uses.

pub mod config;
pub mod scoring;
pub mod service;

pub use config::AiConfig;
pub use scoring::{nearest_enemy, score_action};
pub use service::{AiTurnService, CancelFlag};
