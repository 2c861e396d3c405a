//! Teams, participants, and per-team data storage.
//!
//! ## TeamId
//!
//! Type-safe side identifier supporting 1-255 teams.
//!
//! ## Participant
//!
//! The human or AI that controls a team. Mana is tracked per participant,
//! not per piece.
//!
//! ## TeamMap
//!
//! Per-team data storage backed by `Vec` for O(1) access.

use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Team (side) identifier supporting 1-255 teams.
///
/// Team indices are 0-based: the first team is `TeamId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub u8);

impl TeamId {
    /// Create a new team ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw team index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The team that moves after this one.
    #[must_use]
    pub fn next(self, team_count: usize) -> TeamId {
        TeamId(((self.index() + 1) % team_count) as u8)
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Team {}", self.0)
    }
}

/// Identifier of a player or AI participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub u32);

impl ParticipantId {
    /// Create a new participant ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Participant({})", self.0)
    }
}

/// Who drives a team's turns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Controller {
    /// A connected human player.
    Human(ParticipantId),
    /// The AI turn service.
    Ai(ParticipantId),
}

impl Controller {
    /// The participant behind this controller.
    #[must_use]
    pub const fn participant(self) -> ParticipantId {
        match self {
            Controller::Human(p) | Controller::Ai(p) => p,
        }
    }

    /// Check if this team is AI-controlled.
    #[must_use]
    pub const fn is_ai(self) -> bool {
        matches!(self, Controller::Ai(_))
    }
}

/// Per-team data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use tactics_engine::core::{TeamId, TeamMap};
///
/// let kills: TeamMap<u32> = TeamMap::from_vec(vec![0, 3]);
/// assert_eq!(kills[TeamId::new(1)], 3);
/// assert_eq!(kills.get(TeamId::new(2)), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamMap<T> {
    data: Vec<T>,
}

impl<T> TeamMap<T> {
    /// Build from an explicit list, one entry per team in index order.
    pub fn from_vec(data: Vec<T>) -> Self {
        assert!(!data.is_empty(), "Must have at least 1 team");
        assert!(data.len() <= 255, "At most 255 teams supported");
        Self { data }
    }

    /// Get the number of teams.
    #[must_use]
    pub fn team_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a team's data, if the team exists.
    #[must_use]
    pub fn get(&self, team: TeamId) -> Option<&T> {
        self.data.get(team.index())
    }

    /// Iterate over (TeamId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (TeamId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (TeamId(i as u8), v))
    }
}

impl<T> Index<TeamId> for TeamMap<T> {
    type Output = T;

    fn index(&self, team: TeamId) -> &Self::Output {
        &self.data[team.index()]
    }
}
