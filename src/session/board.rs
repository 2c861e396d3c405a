//! Board state: pieces, controllers, mana, turn counters, history.
//!
//! The board is everything a turn mutates. It is also the context event
//! handlers receive, so rewards land on the same state the turn changed.
//!
//! Pieces live in an `im::OrdMap` keyed by id: iteration order is stable
//! (AI determinism) and snapshots are O(1).

use im::{OrdMap, Vector};

use super::mana::ManaLedger;
use crate::core::{Action, ActionRecord, Controller, ParticipantId, PieceId, Position, TeamId, TeamMap};
use crate::error::{EngineError, Result};
use crate::pieces::Piece;

/// Mutable game board for one session.
#[derive(Debug)]
pub struct Board {
    width: u32,
    height: u32,
    pieces: OrdMap<PieceId, Piece>,
    controllers: TeamMap<Controller>,
    mana: Box<dyn ManaLedger>,

    /// Turn number (starts at 1).
    pub turn_number: u32,

    /// Team whose turn it is.
    pub side_to_move: TeamId,

    action_sequence: u32,
    history: Vector<ActionRecord>,
}

impl Board {
    /// Create an empty board.
    pub fn new(width: u32, height: u32, controllers: TeamMap<Controller>, mana: Box<dyn ManaLedger>) -> Self {
        Self {
            width,
            height,
            pieces: OrdMap::new(),
            controllers,
            mana,
            turn_number: 1,
            side_to_move: TeamId::new(0),
            action_sequence: 0,
            history: Vector::new(),
        }
    }

    /// Board columns.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Board rows.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if a square is on the board.
    #[must_use]
    pub fn in_bounds(&self, position: Position) -> bool {
        position.in_bounds(self.width, self.height)
    }

    // === Teams ===

    /// Number of teams.
    #[must_use]
    pub fn team_count(&self) -> usize {
        self.controllers.team_count()
    }

    /// Who controls a team.
    #[must_use]
    pub fn controller(&self, team: TeamId) -> Option<Controller> {
        self.controllers.get(team).copied()
    }

    /// Iterate over teams and their controllers.
    pub fn controllers(&self) -> impl Iterator<Item = (TeamId, Controller)> + '_ {
        self.controllers.iter().map(|(t, c)| (t, *c))
    }

    // === Pieces ===

    /// Place a piece.
    ///
    /// The square must be on the board and empty, and the id unused.
    pub fn add_piece(&mut self, piece: Piece) -> Result<()> {
        if !self.in_bounds(piece.position) {
            return Err(EngineError::InvariantViolation(format!(
                "{} placed off the board at {}",
                piece.id, piece.position
            )));
        }
        if let Some(other) = self.piece_at(piece.position) {
            return Err(EngineError::InvariantViolation(format!(
                "{} placed on {} occupied by {}",
                piece.id, piece.position, other.id
            )));
        }
        if self.pieces.contains_key(&piece.id) {
            return Err(EngineError::InvariantViolation(format!("{} already on the board", piece.id)));
        }
        self.pieces.insert(piece.id, piece);
        Ok(())
    }

    /// Remove a piece from play.
    pub fn remove_piece(&mut self, id: PieceId) -> Option<Piece> {
        self.pieces.remove(&id)
    }

    /// A piece by id.
    #[must_use]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    /// A mutable piece by id.
    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(&id)
    }

    /// The piece standing on a square.
    #[must_use]
    pub fn piece_at(&self, position: Position) -> Option<&Piece> {
        self.pieces.values().find(|p| p.position == position)
    }

    /// All pieces, in id order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    /// A team's pieces, in id order.
    pub fn pieces_of(&self, team: TeamId) -> impl Iterator<Item = &Piece> {
        self.pieces.values().filter(move |p| p.team == team)
    }

    /// Ids of a team's pieces, in id order.
    #[must_use]
    pub fn piece_ids_of(&self, team: TeamId) -> Vec<PieceId> {
        self.pieces_of(team).map(|p| p.id).collect()
    }

    /// O(1) snapshot of the piece set.
    #[must_use]
    pub fn snapshot(&self) -> OrdMap<PieceId, Piece> {
        self.pieces.clone()
    }

    // === Mana ===

    /// A participant's mana.
    #[must_use]
    pub fn mana(&self, participant: ParticipantId) -> u32 {
        self.mana.balance(participant)
    }

    /// The mana ledger.
    pub fn mana_ledger(&mut self) -> &mut dyn ManaLedger {
        self.mana.as_mut()
    }

    // === History ===

    /// Record a performed action.
    pub fn record_action(&mut self, team: TeamId, action: Action) {
        let record = ActionRecord::new(team, action, self.turn_number, self.action_sequence);
        self.action_sequence += 1;
        self.history.push_back(record);
    }

    /// Every action performed this session.
    #[must_use]
    pub fn history(&self) -> &Vector<ActionRecord> {
        &self.history
    }

    /// Number of actions performed in the current turn.
    #[must_use]
    pub fn actions_this_turn(&self) -> u32 {
        self.action_sequence
    }

    /// Pass the turn to `next`.
    pub fn advance_turn(&mut self, next: TeamId) {
        self.side_to_move = next;
        self.turn_number += 1;
        self.action_sequence = 0;
    }
}
