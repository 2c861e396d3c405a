//! Core engine types: ids, teams, positions, actions, RNG.
//!
//! These are the building blocks every other module shares. None of them
//! read the balance configuration.

pub mod entity;
pub mod player;
pub mod position;
pub mod rng;
pub mod action;

pub use entity::{PieceId, PieceIdGenerator};
pub use player::{Controller, ParticipantId, TeamId, TeamMap};
pub use position::Position;
pub use rng::GameRng;
pub use action::{Action, ActionKind, ActionRecord};
