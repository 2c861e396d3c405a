//! Game session: turn processing for one match.
//!
//! A turn runs `begin_turn` → any number of `perform` → `end_turn`:
//!
//! - `begin_turn`: mover's mana regenerates; a start-of-turn tick runs if
//!   configured.
//! - `perform`: one action through [`Rules::execute`]; events are buffered.
//! - `end_turn`: an end-of-turn tick runs if configured, `TurnEnded` is
//!   raised, the buffer is drained to handlers, then the game result is
//!   checked and the side to move rotates.
//!
//! All mutations of a turn happen before any of its events are dispatched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::board::Board;
use super::mana::{ManaLedger, ManaPools};
use crate::config::{BalanceConfig, CooldownTick};
use crate::core::{Action, Controller, PieceId, Position, TeamId, TeamMap};
use crate::error::{EngineError, Result};
use crate::events::{DispatchReport, DomainEvent, EventDispatcher, DEFAULT_MAX_PASSES};
use crate::pieces::PieceFactory;
use crate::rules::{ActionFilter, ActionOutcome, AllowAll, GameResult, Rules};

/// Where the session is in its turn cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for `begin_turn`.
    Awaiting,
    /// The side to move is acting.
    Acting,
    /// The game is over.
    Finished(GameResult),
}

/// Summary returned by `end_turn`.
#[derive(Debug)]
pub struct TurnSummary {
    /// Team that moved.
    pub team: TeamId,
    /// Turn number that ended.
    pub turn: u32,
    /// Actions performed during the turn.
    pub actions: u32,
    /// Event dispatch outcome, including handler failures.
    pub report: DispatchReport,
    /// Set when this turn ended the game.
    pub result: Option<GameResult>,
}

/// One match: board, configuration snapshot and event pipeline.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use tactics_engine::config::{BalanceConfig, PieceStats};
/// use tactics_engine::core::{Action, Controller, ParticipantId, PieceIdGenerator, Position, TeamId, TeamMap};
/// use tactics_engine::events::EventDispatcher;
/// use tactics_engine::pieces::PieceFactory;
/// use tactics_engine::session::GameSession;
///
/// let config = Arc::new(BalanceConfig::new().with_piece("Pawn", PieceStats::new(10, 2)));
/// let factory = PieceFactory::new(Arc::clone(&config), Arc::new(PieceIdGenerator::new()));
/// let controllers = TeamMap::from_vec(vec![
///     Controller::Human(ParticipantId::new(1)),
///     Controller::Ai(ParticipantId::new(2)),
/// ]);
///
/// let mut session = GameSession::new(config, controllers, EventDispatcher::empty());
/// let pawn = session.spawn(&factory, "Pawn", TeamId::new(0), Position::new(0, 0)).unwrap();
/// session.spawn(&factory, "Pawn", TeamId::new(1), Position::new(7, 7)).unwrap();
///
/// session.begin_turn().unwrap();
/// session.perform(Action::Move { piece: pawn, to: Position::new(1, 1) }).unwrap();
/// let summary = session.end_turn().unwrap();
///
/// assert_eq!(summary.actions, 1);
/// assert_eq!(session.side_to_move(), TeamId::new(1));
/// ```
#[derive(Debug)]
pub struct GameSession {
    config: Arc<BalanceConfig>,
    board: Board,
    events: EventDispatcher<Board>,
    phase: TurnPhase,
}

impl GameSession {
    /// Create a session with in-memory mana pools for every participant.
    ///
    /// The board size and starting mana come from `config`.
    pub fn new(config: Arc<BalanceConfig>, controllers: TeamMap<Controller>, events: EventDispatcher<Board>) -> Self {
        let participants: Vec<_> = controllers.iter().map(|(_, c)| c.participant()).collect();
        let mana = ManaPools::new(config.player_mana.starting, participants);
        Self::with_ledger(config, controllers, Box::new(mana), events)
    }

    /// Create a session over an externally provided mana ledger.
    pub fn with_ledger(
        config: Arc<BalanceConfig>,
        controllers: TeamMap<Controller>,
        mana: Box<dyn ManaLedger>,
        events: EventDispatcher<Board>,
    ) -> Self {
        let board = Board::new(
            config.globals.board_width,
            config.globals.board_height,
            controllers,
            mana,
        );
        Self {
            config,
            board,
            events,
            phase: TurnPhase::Awaiting,
        }
    }

    // === Accessors ===

    /// The configuration snapshot this session plays under.
    #[must_use]
    pub fn config(&self) -> &Arc<BalanceConfig> {
        &self.config
    }

    /// The board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Current turn phase.
    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Team whose turn it is.
    #[must_use]
    pub fn side_to_move(&self) -> TeamId {
        self.board.side_to_move
    }

    /// Current turn number.
    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.board.turn_number
    }

    /// The game result, once finished.
    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        match self.phase {
            TurnPhase::Finished(result) => Some(result),
            _ => None,
        }
    }

    /// Rules over this session's configuration.
    #[must_use]
    pub fn rules(&self) -> Rules<'_> {
        Rules::new(&self.config)
    }

    // === Setup ===

    /// Create a piece with the factory and place it.
    ///
    /// The piece is owned by the team's controlling participant.
    pub fn spawn(&mut self, factory: &PieceFactory, piece_type: &str, team: TeamId, at: Position) -> Result<PieceId> {
        let owner = self
            .board
            .controller(team)
            .ok_or_else(|| EngineError::InvariantViolation(format!("{team} is not in this session")))?
            .participant();
        let piece = factory.create_piece(piece_type, team, at, Some(owner))?;
        let id = piece.id;
        self.board.add_piece(piece)?;
        Ok(id)
    }

    // === Turn cycle ===

    /// Start the side to move's turn.
    pub fn begin_turn(&mut self) -> Result<()> {
        self.expect_phase(TurnPhase::Awaiting, "begin_turn")?;
        let team = self.board.side_to_move;

        if let Some(controller) = self.board.controller(team) {
            let regen = self.config.globals.mana_regen_per_turn;
            let cap = self.config.player_mana.max;
            self.board
                .mana_ledger()
                .grant(controller.participant(), regen, cap);
        }

        if self.config.globals.cooldown_tick == CooldownTick::StartOfTurn {
            Rules::new(&self.config).tick(&mut self.board, team, &mut self.events)?;
        }

        self.phase = TurnPhase::Acting;
        debug!(team = %team, turn = self.board.turn_number, "Turn started");
        Ok(())
    }

    /// Perform one action for the side to move.
    pub fn perform(&mut self, action: Action) -> Result<ActionOutcome> {
        self.perform_filtered(action, &AllowAll)
    }

    /// Perform one action, subject to an extra legality overlay.
    pub fn perform_filtered(&mut self, action: Action, filter: &dyn ActionFilter) -> Result<ActionOutcome> {
        self.expect_phase(TurnPhase::Acting, "perform")?;
        if !filter.permits(&self.board, &action) {
            return Err(crate::error::IllegalAction::BlockedByScenario.into());
        }
        let team = self.board.side_to_move;
        Rules::new(&self.config).execute(&mut self.board, team, &action, &mut self.events)
    }

    /// Finish the side to move's turn and dispatch its events.
    pub fn end_turn(&mut self) -> Result<TurnSummary> {
        self.expect_phase(TurnPhase::Acting, "end_turn")?;
        let team = self.board.side_to_move;
        let turn = self.board.turn_number;
        let actions = self.board.actions_this_turn();

        if self.config.globals.cooldown_tick == CooldownTick::EndOfTurn {
            Rules::new(&self.config).tick(&mut self.board, team, &mut self.events)?;
        }
        self.events.publish(DomainEvent::turn_ended(team, turn));

        let report = self.events.drain(&mut self.board, DEFAULT_MAX_PASSES);

        let result = Rules::game_result(&self.board);
        match result {
            Some(result) => {
                info!(?result, turn, "Game finished");
                self.phase = TurnPhase::Finished(result);
            }
            None => {
                let next = self.next_side(team);
                self.board.advance_turn(next);
                self.phase = TurnPhase::Awaiting;
            }
        }

        Ok(TurnSummary {
            team,
            turn,
            actions,
            report,
            result,
        })
    }

    /// Next team after `team` that still has pieces.
    fn next_side(&self, team: TeamId) -> TeamId {
        let count = self.board.team_count();
        let mut next = team.next(count);
        for _ in 0..count {
            if self.board.pieces_of(next).next().is_some() {
                break;
            }
            next = next.next(count);
        }
        next
    }

    fn expect_phase(&self, expected: TurnPhase, op: &str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(EngineError::TurnState(format!(
                "{op} called while {:?}, expected {:?}",
                self.phase, expected
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AbilitySpec, GlobalRules, PieceStats};
    use crate::core::{ParticipantId, PieceIdGenerator};
    use crate::error::IllegalAction;

    const HUMAN: ParticipantId = ParticipantId(1);

    fn config(tick: CooldownTick, damage: u32) -> Arc<BalanceConfig> {
        let globals = GlobalRules {
            cooldown_tick: tick,
            mana_regen_per_turn: 2,
            ..GlobalRules::default()
        };
        Arc::new(
            BalanceConfig::new()
                .with_globals(globals)
                .with_piece("Mage", PieceStats::new(10, 1).with_ability("Fireball"))
                .with_piece("Pawn", PieceStats::new(10, 2))
                .with_ability("Fireball", AbilitySpec::new(5, 2, 4, damage)),
        )
    }

    fn session(config: Arc<BalanceConfig>) -> (GameSession, PieceId, PieceId) {
        let factory = PieceFactory::new(Arc::clone(&config), Arc::new(PieceIdGenerator::new()));
        let controllers = TeamMap::from_vec(vec![Controller::Human(HUMAN), Controller::Human(ParticipantId(2))]);
        let mut session = GameSession::new(config, controllers, EventDispatcher::empty());
        let mage = session.spawn(&factory, "Mage", TeamId(0), Position::new(0, 0)).unwrap();
        let pawn = session.spawn(&factory, "Pawn", TeamId(1), Position::new(2, 2)).unwrap();
        (session, mage, pawn)
    }

    fn fireball(mage: PieceId, pawn: PieceId) -> Action {
        Action::UseAbility { piece: mage, ability: "Fireball".into(), target: pawn }
    }

    fn pass(session: &mut GameSession) {
        session.begin_turn().unwrap();
        session.end_turn().unwrap();
    }

    #[test]
    fn test_phase_errors() {
        let (mut session, mage, _) = session(config(CooldownTick::StartOfTurn, 3));
        let step = Action::Move { piece: mage, to: Position::new(0, 1) };

        assert!(matches!(session.perform(step), Err(EngineError::TurnState(_))));
        assert!(matches!(session.end_turn(), Err(EngineError::TurnState(_))));
        session.begin_turn().unwrap();
        assert!(matches!(session.begin_turn(), Err(EngineError::TurnState(_))));
    }

    #[test]
    fn test_mana_regen() {
        let (mut session, _, _) = session(config(CooldownTick::StartOfTurn, 3));
        session.begin_turn().unwrap();
        assert_eq!(session.board().mana(HUMAN), 12);
    }

    #[test]
    fn test_start_of_turn_cooldown_tick() {
        let (mut session, mage, pawn) = session(config(CooldownTick::StartOfTurn, 3));

        session.begin_turn().unwrap();
        session.perform(fireball(mage, pawn)).unwrap();
        session.end_turn().unwrap();
        assert_eq!(session.board().piece(mage).unwrap().cooldown("Fireball"), 2);

        pass(&mut session);
        session.begin_turn().unwrap();
        assert_eq!(session.board().piece(mage).unwrap().cooldown("Fireball"), 1);
    }

    #[test]
    fn test_end_of_turn_cooldown_tick() {
        let (mut session, mage, pawn) = session(config(CooldownTick::EndOfTurn, 3));

        session.begin_turn().unwrap();
        session.perform(fireball(mage, pawn)).unwrap();
        session.end_turn().unwrap();
        assert_eq!(session.board().piece(mage).unwrap().cooldown("Fireball"), 1);
    }

    #[test]
    fn test_filter_blocks_action() {
        struct NoMoves;
        impl ActionFilter for NoMoves {
            fn permits(&self, _: &Board, action: &Action) -> bool {
                !matches!(action, Action::Move { .. })
            }
        }

        let (mut session, mage, _) = session(config(CooldownTick::StartOfTurn, 3));
        session.begin_turn().unwrap();
        let step = Action::Move { piece: mage, to: Position::new(0, 1) };
        let err = session.perform_filtered(step, &NoMoves).unwrap_err();
        assert!(matches!(err, EngineError::IllegalAction(IllegalAction::BlockedByScenario)));
    }

    #[test]
    fn test_game_ends_when_team_eliminated() {
        let (mut session, mage, pawn) = session(config(CooldownTick::StartOfTurn, 10));

        session.begin_turn().unwrap();
        let outcome = session.perform(fireball(mage, pawn)).unwrap();
        assert_eq!(outcome.killed, vec![pawn]);

        let summary = session.end_turn().unwrap();
        assert_eq!(summary.result, Some(GameResult::Winner(TeamId(0))));
        assert_eq!(session.result(), Some(GameResult::Winner(TeamId(0))));
        assert!(matches!(session.begin_turn(), Err(EngineError::TurnState(_))));
    }
}
