//! The single legality and mutation path for every actor.
//!
//! Humans, the AI service and tutorial scripts all act through
//! [`Rules::execute`]. It validates the whole action before touching the
//! board, so an action is applied completely or not at all.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use tracing::{debug, info};

use super::ability::{apply_ability, check_ability, Hit};
use super::evolution::{resolve_evolution, Evolution};
use super::movement::{check_attack, check_move, reachable_squares};
use super::shield::regenerate_shields;
use crate::config::BalanceConfig;
use crate::core::{Action, PieceId, TeamId};
use crate::error::{IllegalAction, Result};
use crate::events::{DomainEvent, EventDispatcher, EventKind};
use crate::session::Board;

/// Result of a completed game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// One team is left standing.
    Winner(TeamId),
    /// Every team was eliminated.
    Draw,
}

impl GameResult {
    /// Check if a team won.
    #[must_use]
    pub fn is_winner(&self, team: TeamId) -> bool {
        matches!(self, GameResult::Winner(t) if *t == team)
    }
}

/// Overlay that can forbid otherwise-legal actions.
///
/// Filters only ever restrict; they cannot make an illegal action legal.
pub trait ActionFilter {
    /// Check if `action` is allowed on `board`.
    fn permits(&self, board: &Board, action: &Action) -> bool;
}

/// Filter that allows everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl ActionFilter for AllowAll {
    fn permits(&self, _board: &Board, _action: &Action) -> bool {
        true
    }
}

/// What an executed action did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Damage dealt, in application order.
    pub hits: SmallVec<[Hit; 4]>,
    /// Pieces removed from the board.
    pub killed: Vec<PieceId>,
}

/// What a tick did for one side.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Shield gained per piece.
    pub shields: Vec<(PieceId, u32)>,
    /// Evolutions resolved.
    pub evolutions: Vec<Evolution>,
}

/// Rules over one configuration snapshot.
#[derive(Clone, Copy, Debug)]
pub struct Rules<'a> {
    config: &'a BalanceConfig,
}

impl<'a> Rules<'a> {
    /// Rules for `config`.
    #[must_use]
    pub fn new(config: &'a BalanceConfig) -> Self {
        Self { config }
    }

    /// The configuration these rules read.
    #[must_use]
    pub fn config(&self) -> &'a BalanceConfig {
        self.config
    }

    /// Check `action` for `team` without changing anything.
    pub fn validate(&self, board: &Board, team: TeamId, action: &Action) -> Result<()> {
        if team != board.side_to_move {
            return Err(IllegalAction::NotYourTurn.into());
        }
        let actor_id = action.actor();
        let actor = board
            .piece(actor_id)
            .ok_or(IllegalAction::UnknownPiece(actor_id))?;
        if actor.team != team {
            return Err(IllegalAction::NotYourPiece(actor_id).into());
        }

        match action {
            Action::Move { to, .. } => {
                check_move(board, actor, *to, self.config.globals.first_move_bonus)?;
            }
            Action::Attack { target, .. } => {
                let target = board.piece(*target).ok_or(IllegalAction::UnknownPiece(*target))?;
                check_attack(actor, target)?;
            }
            Action::UseAbility { ability, target, .. } => {
                let target = board.piece(*target).ok_or(IllegalAction::UnknownPiece(*target))?;
                check_ability(self.config, board, actor, ability, target)?;
            }
        }
        Ok(())
    }

    /// Validate and apply `action` for `team`.
    ///
    /// Events are buffered on `events`; nothing is dispatched here. Killed
    /// pieces leave the board immediately.
    pub fn execute(
        &self,
        board: &mut Board,
        team: TeamId,
        action: &Action,
        events: &mut EventDispatcher<Board>,
    ) -> Result<ActionOutcome> {
        self.validate(board, team, action)?;

        let actor_id = action.actor();
        let hits = match action {
            Action::Move { to, .. } => {
                if let Some(piece) = board.piece_mut(actor_id) {
                    piece.move_to(*to);
                }
                SmallVec::new()
            }
            Action::Attack { target, .. } => {
                let damage = board.piece(actor_id).map_or(0, |p| p.attack);
                let outcome = board
                    .piece_mut(*target)
                    .ok_or(IllegalAction::UnknownPiece(*target))?
                    .apply_damage(damage);
                smallvec![Hit {
                    target: *target,
                    outcome,
                }]
            }
            Action::UseAbility { ability, target, .. } => {
                let spec = self.config.ability(ability)?;
                let hits = apply_ability(board, actor_id, ability, spec, *target)?;
                if let Some(caster) = board.piece(actor_id) {
                    events.publish(DomainEvent::new(EventKind::AbilityUsed {
                        caster: caster.to_ref(),
                        ability: ability.clone(),
                        targets: hits.iter().map(|h| h.target).collect(),
                    }));
                }
                hits
            }
        };

        let mut killed = Vec::new();
        if let Some(killer) = board.piece(actor_id).map(|p| p.to_ref()) {
            for hit in hits.iter().filter(|h| h.outcome.killed) {
                if let Some(victim) = board.remove_piece(hit.target) {
                    info!(killer = %killer.id, victim = %victim.id, victim_type = %victim.piece_type, "Piece killed");
                    events.publish(DomainEvent::piece_killed(killer.clone(), victim.to_ref()));
                    killed.push(victim.id);
                }
            }
        }

        debug!(team = %team, action = ?action.kind(), actor = %actor_id, hits = hits.len(), "Action executed");
        board.record_action(team, action.clone());
        Ok(ActionOutcome { hits, killed })
    }

    /// Every legal action for `team`, grouped by piece in id order.
    #[must_use]
    pub fn legal_actions(&self, board: &Board, team: TeamId) -> Vec<Action> {
        board
            .piece_ids_of(team)
            .into_iter()
            .flat_map(|id| self.legal_actions_for(board, id))
            .collect()
    }

    /// Every legal action for one piece: moves, then attacks, then abilities.
    #[must_use]
    pub fn legal_actions_for(&self, board: &Board, id: PieceId) -> Vec<Action> {
        let Some(piece) = board.piece(id) else {
            return Vec::new();
        };
        let team = piece.team;
        if team != board.side_to_move {
            return Vec::new();
        }

        let mut actions: Vec<Action> = reachable_squares(board, piece, self.config.globals.first_move_bonus)
            .into_iter()
            .map(|to| Action::Move { piece: id, to })
            .collect();

        let enemies: Vec<PieceId> = board
            .pieces()
            .filter(|p| p.team != team && p.is_alive())
            .map(|p| p.id)
            .collect();

        actions.extend(
            enemies
                .iter()
                .map(|&target| Action::Attack { piece: id, target })
                .filter(|a| self.validate(board, team, a).is_ok()),
        );

        let abilities = self
            .config
            .piece_stats(&piece.piece_type)
            .map(|s| s.abilities.as_slice())
            .unwrap_or_default();
        for ability in abilities {
            actions.extend(
                enemies
                    .iter()
                    .map(|&target| Action::UseAbility {
                        piece: id,
                        ability: ability.clone(),
                        target,
                    })
                    .filter(|a| self.validate(board, team, a).is_ok()),
            );
        }

        actions
    }

    /// Run one tick for `team`: cooldowns, shield regen, pending evolutions.
    pub fn tick(&self, board: &mut Board, team: TeamId, events: &mut EventDispatcher<Board>) -> Result<TickOutcome> {
        for id in board.piece_ids_of(team) {
            if let Some(piece) = board.piece_mut(id) {
                piece.tick_cooldowns();
            }
        }

        let shields = regenerate_shields(board, &self.config.shield_system, team);

        let mut evolutions = Vec::new();
        for id in board.piece_ids_of(team) {
            let Some(piece) = board.piece_mut(id) else {
                continue;
            };
            for step in resolve_evolution(piece, self.config)? {
                events.publish(DomainEvent::new(EventKind::PieceEvolved {
                    piece: piece.to_ref(),
                    from: step.from.clone(),
                }));
                evolutions.push(step);
            }
        }

        Ok(TickOutcome { shields, evolutions })
    }

    /// The game result, if at most one team still has pieces.
    #[must_use]
    pub fn game_result(board: &Board) -> Option<GameResult> {
        let mut standing = board
            .controllers()
            .map(|(team, _)| team)
            .filter(|team| board.pieces_of(*team).next().is_some());

        match (standing.next(), standing.next()) {
            (None, _) => Some(GameResult::Draw),
            (Some(team), None) => Some(GameResult::Winner(team)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AbilitySpec, PieceStats};
    use crate::core::{Controller, ParticipantId, Position, TeamMap};
    use crate::events::EventTag;
    use crate::pieces::Piece;
    use crate::session::ManaPools;

    const HUMAN: ParticipantId = ParticipantId(1);

    fn config() -> BalanceConfig {
        BalanceConfig::new()
            .with_piece("Pawn", PieceStats::new(5, 2).with_ability("Bolt").with_xp_to_evolve(2))
            .with_piece("Knight", PieceStats::new(9, 3))
            .with_ability("Bolt", AbilitySpec::new(1, 2, 3, 5))
            .with_evolution("Pawn", &["Knight"])
    }

    fn setup(config: &BalanceConfig) -> Board {
        let controllers = TeamMap::from_vec(vec![Controller::Human(HUMAN), Controller::Ai(ParticipantId(2))]);
        let mut board = Board::new(8, 8, controllers, Box::new(ManaPools::new(5, [HUMAN])));
        let stats = config.piece_stats("Pawn").unwrap();
        let mut place = |id: u32, team: u8, x: i32, y: i32, owner: Option<ParticipantId>| {
            let piece = Piece::from_stats(PieceId(id), "Pawn", TeamId(team), Position::new(x, y), owner, stats, 2);
            board.add_piece(piece).unwrap();
        };
        place(1, 0, 0, 0, Some(HUMAN));
        place(2, 1, 1, 1, None);
        place(3, 1, 5, 5, None);
        board
    }

    #[test]
    fn test_wrong_turn_and_wrong_piece() {
        let config = config();
        let board = setup(&config);
        let rules = Rules::new(&config);

        let attack = Action::Attack { piece: PieceId(1), target: PieceId(2) };
        assert!(rules.validate(&board, TeamId(0), &attack).is_ok());
        assert!(matches!(
            rules.validate(&board, TeamId(1), &attack),
            Err(crate::error::EngineError::IllegalAction(IllegalAction::NotYourTurn))
        ));

        let borrowed = Action::Attack { piece: PieceId(2), target: PieceId(1) };
        assert!(matches!(
            rules.validate(&board, TeamId(0), &borrowed),
            Err(crate::error::EngineError::IllegalAction(IllegalAction::NotYourPiece(_)))
        ));
    }

    #[test]
    fn test_attack_and_history() {
        let config = config();
        let mut board = setup(&config);
        let mut events = EventDispatcher::empty();
        let rules = Rules::new(&config);

        let attack = Action::Attack { piece: PieceId(1), target: PieceId(2) };
        let outcome = rules.execute(&mut board, TeamId(0), &attack, &mut events).unwrap();

        assert_eq!(outcome.hits[0].outcome.hp_lost, 2);
        assert!(outcome.killed.is_empty());
        assert_eq!(board.piece(PieceId(2)).unwrap().hp(), 3);
        assert_eq!(board.history().len(), 1);
        assert!(events.pending().is_empty());
    }

    #[test]
    fn test_kill_removes_piece_and_buffers_events() {
        let config = config();
        let mut board = setup(&config);
        let mut events = EventDispatcher::empty();
        let rules = Rules::new(&config);

        let bolt = Action::UseAbility { piece: PieceId(1), ability: "Bolt".into(), target: PieceId(2) };
        let outcome = rules.execute(&mut board, TeamId(0), &bolt, &mut events).unwrap();

        assert_eq!(outcome.killed, vec![PieceId(2)]);
        assert!(board.piece(PieceId(2)).is_none());
        let tags: Vec<_> = events.pending().iter().map(DomainEvent::tag).collect();
        assert_eq!(tags, vec![EventTag::AbilityUsed, EventTag::PieceKilled]);
    }

    #[test]
    fn test_rejected_action_changes_nothing() {
        let config = config();
        let mut board = setup(&config);
        let mut events = EventDispatcher::empty();
        let rules = Rules::new(&config);
        let before = board.snapshot();

        let far = Action::Attack { piece: PieceId(1), target: PieceId(3) };
        assert!(rules.execute(&mut board, TeamId(0), &far, &mut events).is_err());
        assert_eq!(board.snapshot(), before);
        assert!(board.history().is_empty());
    }

    #[test]
    fn test_legal_actions() {
        let config = config();
        let board = setup(&config);
        let rules = Rules::new(&config);

        let actions = rules.legal_actions(&board, TeamId(0));
        // (0,1) and (1,0) are free; (1,1) is occupied.
        assert_eq!(actions.iter().filter(|a| matches!(a, Action::Move { .. })).count(), 2);
        assert!(actions.contains(&Action::Attack { piece: PieceId(1), target: PieceId(2) }));
        assert!(!actions.contains(&Action::Attack { piece: PieceId(1), target: PieceId(3) }));
        assert!(actions.contains(&Action::UseAbility {
            piece: PieceId(1),
            ability: "Bolt".into(),
            target: PieceId(2)
        }));
        assert!(rules.legal_actions(&board, TeamId(1)).is_empty());
    }

    #[test]
    fn test_tick_resolves_pending_evolution() {
        let config = config();
        let mut board = setup(&config);
        let mut events = EventDispatcher::empty();
        let rules = Rules::new(&config);

        board.piece_mut(PieceId(1)).unwrap().gain_xp(2);
        board.piece_mut(PieceId(1)).unwrap().start_cooldown("Bolt", 2);

        let outcome = rules.tick(&mut board, TeamId(0), &mut events).unwrap();
        let piece = board.piece(PieceId(1)).unwrap();
        assert_eq!(outcome.evolutions.len(), 1);
        assert_eq!(piece.piece_type, "Knight");
        assert_eq!(piece.cooldown("Bolt"), 1);
        assert_eq!(events.pending()[0].tag(), EventTag::PieceEvolved);
    }

    #[test]
    fn test_game_result() {
        let config = config();
        let mut board = setup(&config);
        assert_eq!(Rules::game_result(&board), None);

        board.remove_piece(PieceId(2));
        board.remove_piece(PieceId(3));
        assert_eq!(Rules::game_result(&board), Some(GameResult::Winner(TeamId(0))));

        board.remove_piece(PieceId(1));
        assert_eq!(Rules::game_result(&board), Some(GameResult::Draw));
    }
}
