//! Domain event types.
//!
//! Events are transient records of something that happened during a turn.
//! They are buffered while the turn mutates the board and dispatched to
//! handlers afterwards; nothing persists them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{PieceId, TeamId};
use crate::pieces::PieceRef;

/// Registry key for an event kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventTag {
    /// [`EventKind::PieceKilled`].
    PieceKilled,
    /// [`EventKind::PieceEvolved`].
    PieceEvolved,
    /// [`EventKind::AbilityUsed`].
    AbilityUsed,
    /// [`EventKind::TurnEnded`].
    TurnEnded,
}

impl EventTag {
    /// Every tag, for handlers that listen to everything.
    pub const ALL: [EventTag; 4] = [
        EventTag::PieceKilled,
        EventTag::PieceEvolved,
        EventTag::AbilityUsed,
        EventTag::TurnEnded,
    ];
}

impl std::fmt::Display for EventTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventTag::PieceKilled => "PieceKilled",
            EventTag::PieceEvolved => "PieceEvolved",
            EventTag::AbilityUsed => "AbilityUsed",
            EventTag::TurnEnded => "TurnEnded",
        };
        f.write_str(name)
    }
}

/// Event payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventKind {
    /// A piece's HP reached zero and it left the board.
    PieceKilled {
        /// The piece that landed the killing blow.
        killer: PieceRef,
        /// The piece that died, as it was when it died.
        victim: PieceRef,
    },
    /// A piece changed type.
    PieceEvolved {
        /// The piece after evolving.
        piece: PieceRef,
        /// Its type before evolving.
        from: String,
    },
    /// A piece used an ability.
    AbilityUsed {
        /// The caster.
        caster: PieceRef,
        /// Ability name.
        ability: String,
        /// Pieces the ability hit.
        targets: SmallVec<[PieceId; 4]>,
    },
    /// A team finished its turn.
    TurnEnded {
        /// The team that moved.
        team: TeamId,
        /// The turn number that ended.
        turn: u32,
    },
}

impl EventKind {
    /// This payload's registry key.
    #[must_use]
    pub fn tag(&self) -> EventTag {
        match self {
            EventKind::PieceKilled { .. } => EventTag::PieceKilled,
            EventKind::PieceEvolved { .. } => EventTag::PieceEvolved,
            EventKind::AbilityUsed { .. } => EventTag::AbilityUsed,
            EventKind::TurnEnded { .. } => EventTag::TurnEnded,
        }
    }
}

/// A timestamped domain event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    /// When the event was raised.
    pub occurred_at: DateTime<Utc>,
    /// What happened.
    pub kind: EventKind,
}

impl DomainEvent {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self::at(Utc::now(), kind)
    }

    /// Create an event with an explicit timestamp.
    #[must_use]
    pub fn at(occurred_at: DateTime<Utc>, kind: EventKind) -> Self {
        Self { occurred_at, kind }
    }

    /// Registry key.
    #[must_use]
    pub fn tag(&self) -> EventTag {
        self.kind.tag()
    }

    /// Shorthand for a [`EventKind::PieceKilled`] event.
    #[must_use]
    pub fn piece_killed(killer: PieceRef, victim: PieceRef) -> Self {
        Self::new(EventKind::PieceKilled { killer, victim })
    }

    /// Shorthand for a [`EventKind::TurnEnded`] event.
    #[must_use]
    pub fn turn_ended(team: TeamId, turn: u32) -> Self {
        Self::new(EventKind::TurnEnded { team, turn })
    }
}
