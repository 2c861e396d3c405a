//! Action representation.
//!
//! Every actor (human, AI, tutorial script) expresses a turn as a sequence
//! of `Action`s, and every action goes through the same legality check and
//! mutation path in [`crate::rules::Rules`].

use serde::{Deserialize, Serialize};

use super::entity::PieceId;
use super::player::TeamId;
use super::position::Position;

/// A single turn action.
///
/// ## Example
///
/// ```
/// use tactics_engine::core::{Action, ActionKind, PieceId, Position};
///
/// let step = Action::Move { piece: PieceId(1), to: Position::new(0, 1) };
/// let bolt = Action::UseAbility {
///     piece: PieceId(1),
///     ability: "Fireball".to_string(),
///     target: PieceId(9),
/// };
///
/// assert_eq!(step.kind(), ActionKind::Move);
/// assert_eq!(bolt.actor(), PieceId(1));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Move a piece to an empty square.
    Move {
        /// Piece being moved.
        piece: PieceId,
        /// Destination square.
        to: Position,
    },
    /// Basic attack against an enemy piece.
    Attack {
        /// Attacking piece.
        piece: PieceId,
        /// Piece being attacked.
        target: PieceId,
    },
    /// Use a configured ability.
    UseAbility {
        /// Caster.
        piece: PieceId,
        /// Ability name (key into the balance configuration).
        ability: String,
        /// Primary target; AoE abilities are centred on it.
        target: PieceId,
    },
}

impl Action {
    /// The piece performing the action.
    #[must_use]
    pub fn actor(&self) -> PieceId {
        match self {
            Action::Move { piece, .. }
            | Action::Attack { piece, .. }
            | Action::UseAbility { piece, .. } => *piece,
        }
    }

    /// The targeted piece, if the action has one.
    #[must_use]
    pub fn target(&self) -> Option<PieceId> {
        match self {
            Action::Move { .. } => None,
            Action::Attack { target, .. } | Action::UseAbility { target, .. } => Some(*target),
        }
    }

    /// The action's kind tag.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Move { .. } => ActionKind::Move,
            Action::Attack { .. } => ActionKind::Attack,
            Action::UseAbility { .. } => ActionKind::Ability,
        }
    }
}

/// Kind tag for an [`Action`], used by scenario overlays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    /// [`Action::Move`].
    Move,
    /// [`Action::Attack`].
    Attack,
    /// [`Action::UseAbility`].
    Ability,
}

/// A performed action with metadata for history tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The team that acted.
    pub team: TeamId,

    /// The action taken.
    pub action: Action,

    /// Turn number when the action was taken.
    pub turn: u32,

    /// Sequence number within the turn (for ordering).
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(team: TeamId, action: Action, turn: u32, sequence: u32) -> Self {
        Self {
            team,
            action,
            turn,
            sequence,
        }
    }
}
