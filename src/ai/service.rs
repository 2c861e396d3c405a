//! AI turn service.
//!
//! Plays one turn for an AI-controlled side, one action per piece at most:
//!
//! 1. Order the side's pieces by evolution progress (highest first), then
//!    by id. The order is taken from a snapshot at the start of the turn.
//! 2. For each piece, enumerate its legal actions, score them, and shuffle
//!    with the seeded RNG before a stable sort so equal scores break ties
//!    reproducibly.
//! 3. Try candidates best-first through [`GameSession::perform`]. A rejected
//!    candidate is skipped; the first accepted one ends that piece's turn.
//!    When nothing scores above zero the best-ranked legal action is still
//!    taken, so a piece with a legal action never passes.
//!
//! Cancellation is checked between pieces. Each action is applied whole or
//! not at all, so a cancelled turn leaves a consistent board.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use super::config::AiConfig;
use super::scoring::score_action;
use crate::core::{Action, GameRng, PieceId, TeamId};
use crate::error::{EngineError, Result};
use crate::session::{GameSession, TurnPhase};

/// Cooperative cancellation signal for an AI turn.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A flag that is not set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Selects and executes actions for AI-controlled teams.
#[derive(Clone, Debug, Default)]
pub struct AiTurnService {
    overrides: Option<AiConfig>,
}

impl AiTurnService {
    /// Service using each session's configured AI tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Service with fixed tuning, ignoring the session's `ai` section.
    #[must_use]
    pub fn with_config(ai: AiConfig) -> Self {
        Self { overrides: Some(ai) }
    }

    /// Play the side to move's actions for this turn.
    ///
    /// The turn must already have begun. Returns `false` only when no piece
    /// had a legal action or the turn was cancelled before the first one;
    /// callers treat that as a skipped turn.
    pub fn make_ai_turn(&self, session: &mut GameSession, cancel: &CancelFlag) -> Result<bool> {
        if session.phase() != TurnPhase::Acting {
            return Err(EngineError::TurnState(format!(
                "AI turn requested while {:?}",
                session.phase()
            )));
        }
        let team = session.side_to_move();
        if !session.board().controller(team).is_some_and(|c| c.is_ai()) {
            return Err(EngineError::TurnState(format!("{team} is not AI-controlled")));
        }

        let ai = self
            .overrides
            .clone()
            .unwrap_or_else(|| session.config().ai.clone());
        let mut rng = GameRng::new(ai.seed).for_turn(team, session.turn_number());

        let mut acted = false;
        for id in Self::piece_order(session, team) {
            if cancel.is_cancelled() {
                debug!(team = %team, "AI turn cancelled");
                break;
            }

            for action in Self::ranked_candidates(session, &ai, id, &mut rng) {
                match session.perform(action.clone()) {
                    Ok(_) => {
                        debug!(team = %team, piece = %id, ?action, "AI action");
                        acted = true;
                        break;
                    }
                    Err(err) if err.is_illegal_action() => {
                        trace!(piece = %id, ?action, error = %err, "AI candidate rejected");
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        Ok(acted)
    }

    /// Pieces of `team` in acting order.
    fn piece_order(session: &GameSession, team: TeamId) -> Vec<PieceId> {
        let snapshot = session.board().snapshot();
        let mut pieces: Vec<_> = snapshot.values().filter(|p| p.team == team).collect();
        pieces.sort_by(|a, b| {
            b.evolution_progress()
                .total_cmp(&a.evolution_progress())
                .then(a.id.cmp(&b.id))
        });
        pieces.into_iter().map(|p| p.id).collect()
    }

    /// Legal actions for one piece, best first.
    fn ranked_candidates(session: &GameSession, ai: &AiConfig, id: PieceId, rng: &mut GameRng) -> Vec<Action> {
        let board = session.board();
        let mut scored: Vec<(Action, f64)> = session
            .rules()
            .legal_actions_for(board, id)
            .into_iter()
            .map(|action| {
                let score = score_action(board, session.config(), ai, &action);
                (action, score)
            })
            .collect();

        rng.shuffle(&mut scored);
        scored.sort_by(|(_, a), (_, b)| b.total_cmp(a));
        scored.into_iter().map(|(action, _)| action).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BalanceConfig, PieceStats};
    use crate::core::{Controller, ParticipantId, PieceIdGenerator, Position, TeamMap};
    use crate::events::EventDispatcher;
    use crate::pieces::PieceFactory;

    fn session() -> (GameSession, PieceFactory) {
        let config = Arc::new(BalanceConfig::new().with_piece("Pawn", PieceStats::new(10, 3)));
        let factory = PieceFactory::new(Arc::clone(&config), Arc::new(PieceIdGenerator::new()));
        let controllers = TeamMap::from_vec(vec![
            Controller::Ai(ParticipantId(1)),
            Controller::Human(ParticipantId(2)),
        ]);
        (GameSession::new(config, controllers, EventDispatcher::empty()), factory)
    }

    #[test]
    fn test_requires_acting_ai_side() {
        let (mut session, _) = session();
        let service = AiTurnService::new();
        assert!(matches!(
            service.make_ai_turn(&mut session, &CancelFlag::new()),
            Err(EngineError::TurnState(_))
        ));
    }

    #[test]
    fn test_attacks_adjacent_enemy() {
        let (mut session, factory) = session();
        let me = session.spawn(&factory, "Pawn", TeamId(0), Position::new(3, 3)).unwrap();
        let foe = session.spawn(&factory, "Pawn", TeamId(1), Position::new(3, 4)).unwrap();

        session.begin_turn().unwrap();
        assert!(AiTurnService::new().make_ai_turn(&mut session, &CancelFlag::new()).unwrap());

        assert_eq!(session.board().piece(foe).unwrap().hp(), 7);
        assert_eq!(session.board().piece(me).unwrap().position, Position::new(3, 3));
    }

    #[test]
    fn test_cancelled_before_start_takes_no_action() {
        let (mut session, factory) = session();
        session.spawn(&factory, "Pawn", TeamId(0), Position::new(0, 0)).unwrap();
        session.spawn(&factory, "Pawn", TeamId(1), Position::new(0, 1)).unwrap();
        session.begin_turn().unwrap();

        let cancel = CancelFlag::new();
        cancel.cancel();
        assert!(!AiTurnService::new().make_ai_turn(&mut session, &cancel).unwrap());
        assert!(session.board().history().is_empty());
    }
}
