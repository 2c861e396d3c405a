//! Pieces: the mutable combat entities and the factory that builds them.

pub mod piece;
pub mod factory;

pub use factory::PieceFactory;
pub use piece::{DamageOutcome, Piece, PieceRef};
