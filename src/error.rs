//! Engine error taxonomy.
//!
//! - Configuration errors (`ConfigurationMissing`, `ConfigurationLookup`,
//!   `InvalidPayload`) and `ImmutableVersion` are surfaced to the caller.
//! - `IllegalAction` goes back to the acting side: humans get a rejection,
//!   the AI moves on to its next candidate.
//! - `InvariantViolation` signals a programming error in the caller.

use thiserror::Error;

use crate::config::{VersionId, VersionStatus};
use crate::core::PieceId;

/// Result alias used throughout the crate.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Errors raised by the rules engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No configuration version is Active.
    #[error("no active balance configuration")]
    ConfigurationMissing,

    /// A piece type or ability name is not in the active configuration.
    #[error("unknown {kind} '{key}' in balance configuration")]
    ConfigurationLookup {
        /// Which table was searched ("piece type", "ability").
        kind: &'static str,
        /// The missing key.
        key: String,
    },

    /// Attempted to edit a version that is not a Draft.
    #[error("version {version} is {status:?} and cannot be edited")]
    ImmutableVersion {
        /// The version that was targeted.
        version: VersionId,
        /// Its current status.
        status: VersionStatus,
    },

    /// The version store has no such version.
    #[error("version {0} not found")]
    VersionNotFound(VersionId),

    /// A configuration payload failed to parse.
    #[error("invalid configuration payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// An action failed its legality check.
    #[error("illegal action: {0}")]
    IllegalAction(#[from] IllegalAction),

    /// A turn operation was called in the wrong phase.
    #[error("turn state: {0}")]
    TurnState(String),

    /// A caller attempted a write that breaks an entity invariant.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    /// Shorthand for a missing piece type.
    pub fn unknown_piece_type(key: impl Into<String>) -> Self {
        EngineError::ConfigurationLookup {
            kind: "piece type",
            key: key.into(),
        }
    }

    /// Shorthand for a missing ability.
    pub fn unknown_ability(key: impl Into<String>) -> Self {
        EngineError::ConfigurationLookup {
            kind: "ability",
            key: key.into(),
        }
    }

    /// Check if this error is a rejected action (recoverable by the actor).
    #[must_use]
    pub fn is_illegal_action(&self) -> bool {
        matches!(self, EngineError::IllegalAction(_))
    }
}

/// Why an action was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IllegalAction {
    /// No live piece with this id is on the board.
    #[error("{0} is not on the board")]
    UnknownPiece(PieceId),

    /// The actor belongs to another team.
    #[error("{0} is not controlled by the acting team")]
    NotYourPiece(PieceId),

    /// The acting team is not the side to move.
    #[error("it is not this team's turn")]
    NotYourTurn,

    /// Target is beyond range / movement allowance.
    #[error("target is out of range ({distance} > {limit})")]
    OutOfRange {
        /// Measured distance.
        distance: u32,
        /// Allowed maximum.
        limit: u32,
    },

    /// Destination is off the board.
    #[error("destination is off the board")]
    OutOfBounds,

    /// Destination square is occupied.
    #[error("destination is occupied by {0}")]
    Occupied(PieceId),

    /// Target piece is dead.
    #[error("target {0} is dead")]
    DeadTarget(PieceId),

    /// Target is on the actor's own team.
    #[error("target {0} is an ally")]
    FriendlyTarget(PieceId),

    /// The owning participant lacks mana.
    #[error("insufficient mana: need {needed}, have {available}")]
    InsufficientMana {
        /// Ability cost.
        needed: u32,
        /// Current pool.
        available: u32,
    },

    /// The ability is still cooling down.
    #[error("ability '{ability}' is on cooldown for {remaining} more turn(s)")]
    CooldownNotReady {
        /// Ability name.
        ability: String,
        /// Turns remaining.
        remaining: u32,
    },

    /// The piece's type does not list this ability.
    #[error("piece cannot use ability '{0}'")]
    AbilityNotKnown(String),

    /// The piece has no owning participant, so there is no mana pool to pay from.
    #[error("piece has no owning participant")]
    NoManaPool,

    /// The active scenario forbids this action.
    #[error("action is not allowed by the current scenario")]
    BlockedByScenario,
}
