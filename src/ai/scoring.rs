//! Candidate scoring.
//!
//! Scores are only compared against each other. Higher is better; a score
//! of 0 or less marks an action with nothing to gain, taken only when a
//! piece has no better option.
//!
//! - Attacks and abilities: base weight, plus the fraction of each target's
//!   remaining HP and shield removed, plus a kill bonus for lethal hits.
//! - Kill bonus: `kill_weight * (1 + reward xp + reward mana)`, plus
//!   `evolution_weight * progress` so pieces near evolving take the kills.
//! - Moves: `advance_weight` per square closed toward the nearest enemy.

use super::config::AiConfig;
use crate::config::BalanceConfig;
use crate::core::{Action, Position};
use crate::pieces::Piece;
use crate::rules::ability::affected_pieces;
use crate::session::Board;

/// Score `action` on `board`. Unknown pieces or abilities score 0.
#[must_use]
pub fn score_action(board: &Board, config: &BalanceConfig, ai: &AiConfig, action: &Action) -> f64 {
    let Some(actor) = board.piece(action.actor()) else {
        return 0.0;
    };

    match action {
        Action::Move { to, .. } => {
            let Some(goal) = nearest_enemy(board, actor) else {
                return 0.0;
            };
            let before = f64::from(actor.position.distance(goal));
            let after = f64::from(to.distance(goal));
            ai.advance_weight * (before - after)
        }
        Action::Attack { target, .. } => board.piece(*target).map_or(0.0, |target| {
            ai.attack_weight + hit_value(config, ai, actor, target, actor.attack)
        }),
        Action::UseAbility { ability, target, .. } => {
            let (Some(target), Ok(spec)) = (board.piece(*target), config.ability(ability)) else {
                return 0.0;
            };
            affected_pieces(board, actor, spec, target)
                .into_iter()
                .filter_map(|id| board.piece(id))
                .map(|hit| hit_value(config, ai, actor, hit, spec.damage))
                .fold(ai.ability_weight, |acc, v| acc + v)
        }
    }
}

/// Value of dealing `damage` to `target`.
fn hit_value(config: &BalanceConfig, ai: &AiConfig, actor: &Piece, target: &Piece, damage: u32) -> f64 {
    let durability = target.hp() + target.shield_hp();
    if durability == 0 {
        return 0.0;
    }
    let dealt = f64::from(damage.min(durability)) / f64::from(durability);

    if damage < durability {
        return dealt;
    }
    let reward = config
        .kill_reward(&target.piece_type)
        .map_or(0.0, |r| f64::from(r.xp) + f64::from(r.mana));
    dealt + ai.kill_weight * (1.0 + reward) + ai.evolution_weight * actor.evolution_progress()
}

/// Position of the closest live enemy; ties go to the lowest id.
#[must_use]
pub fn nearest_enemy(board: &Board, piece: &Piece) -> Option<Position> {
    board
        .pieces()
        .filter(|p| p.team != piece.team && p.is_alive())
        .min_by_key(|p| (piece.position.distance(p.position), p.id))
        .map(|p| p.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AbilitySpec, PieceStats};
    use crate::core::{Controller, ParticipantId, PieceId, TeamId, TeamMap};
    use crate::session::ManaPools;

    fn setup() -> (Board, BalanceConfig) {
        let config = BalanceConfig::new()
            .with_piece("Pawn", PieceStats::new(4, 2).with_range(2).with_ability("Burst"))
            .with_ability("Burst", AbilitySpec::new(1, 1, 2, 4).area(1))
            .with_kill_reward("Pawn", 1, 1);
        let controllers = TeamMap::from_vec(vec![Controller::Ai(ParticipantId(1)), Controller::Human(ParticipantId(2))]);
        let mut board = Board::new(8, 8, controllers, Box::new(ManaPools::new(5, [ParticipantId(1)])));
        let stats = config.piece_stats("Pawn").unwrap();
        for (id, team, x, y) in [(1, 0, 0, 0), (2, 1, 2, 0), (3, 1, 2, 1), (4, 1, 6, 6)] {
            let piece = Piece::from_stats(PieceId(id), "Pawn", TeamId(team), Position::new(x, y), None, stats, 0);
            board.add_piece(piece).unwrap();
        }
        (board, config)
    }

    #[test]
    fn test_area_kill_beats_attack() {
        let (board, config) = setup();
        let ai = AiConfig::default();

        let attack = Action::Attack { piece: PieceId(1), target: PieceId(2) };
        let burst = Action::UseAbility { piece: PieceId(1), ability: "Burst".into(), target: PieceId(2) };

        let attack_score = score_action(&board, &config, &ai, &attack);
        let burst_score = score_action(&board, &config, &ai, &burst);
        assert!((attack_score - 1.5).abs() < 1e-9);
        assert!(burst_score > attack_score);
    }

    #[test]
    fn test_move_scores_by_advance() {
        let (board, config) = setup();
        let ai = AiConfig::default().with_advance_weight(1.0);

        let forward = Action::Move { piece: PieceId(1), to: Position::new(1, 0) };
        let sideways = Action::Move { piece: PieceId(1), to: Position::new(0, 1) };
        assert!((score_action(&board, &config, &ai, &forward) - 1.0).abs() < 1e-9);
        assert!(score_action(&board, &config, &ai, &sideways).abs() < 1e-9);
    }

    #[test]
    fn test_weights_reorder_candidates() {
        let (mut board, config) = setup();
        let ai = AiConfig::default()
            .with_kill_weight(0.0)
            .with_ability_weight(0.0)
            .with_attack_weight(3.0)
            .with_evolution_weight(0.0);

        let attack = Action::Attack { piece: PieceId(1), target: PieceId(2) };
        let burst = Action::UseAbility { piece: PieceId(1), ability: "Burst".into(), target: PieceId(2) };

        // Attack: 3 + half of 4 HP. Burst: two full kills, no bonuses
        assert!((score_action(&board, &config, &ai, &attack) - 3.5).abs() < 1e-9);
        assert!((score_action(&board, &config, &ai, &burst) - 2.0).abs() < 1e-9);

        // Halfway to evolving, each kill is now worth 4 * 0.5 more
        let stats = config.piece_stats("Pawn").unwrap();
        let mut veteran = Piece::from_stats(PieceId(1), "Pawn", TeamId(0), Position::new(0, 0), None, stats, 4);
        veteran.gain_xp(2);
        board.remove_piece(PieceId(1));
        board.add_piece(veteran).unwrap();

        let ai = ai.with_evolution_weight(4.0);
        assert!((score_action(&board, &config, &ai, &attack) - 3.5).abs() < 1e-9);
        assert!((score_action(&board, &config, &ai, &burst) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_enemy_tie_breaks_on_id() {
        let (board, _) = setup();
        let me = board.piece(PieceId(1)).unwrap();
        assert_eq!(nearest_enemy(&board, me), Some(Position::new(2, 0)));
    }
}
