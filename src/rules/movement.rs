//! Move and basic-attack legality.

use crate::core::Position;
use crate::error::IllegalAction;
use crate::pieces::Piece;
use crate::session::Board;

/// Check that `piece` may move to `to`.
///
/// The destination must be on the board, empty, and within the piece's
/// movement allowance (plus `first_move_bonus` on its first move).
pub fn check_move(board: &Board, piece: &Piece, to: Position, first_move_bonus: u32) -> Result<(), IllegalAction> {
    if !board.in_bounds(to) {
        return Err(IllegalAction::OutOfBounds);
    }
    if let Some(other) = board.piece_at(to) {
        return Err(IllegalAction::Occupied(other.id));
    }

    let distance = piece.position.distance(to);
    let limit = piece.movement_allowance(first_move_bonus);
    if distance == 0 || distance > limit {
        return Err(IllegalAction::OutOfRange { distance, limit });
    }
    Ok(())
}

/// Check that `target` is a live enemy within `range` of `actor`.
///
/// Shared by basic attacks and ability targeting.
pub fn check_target(actor: &Piece, target: &Piece, range: u32) -> Result<(), IllegalAction> {
    if !target.is_alive() {
        return Err(IllegalAction::DeadTarget(target.id));
    }
    if target.team == actor.team {
        return Err(IllegalAction::FriendlyTarget(target.id));
    }

    let distance = actor.position.distance(target.position);
    if distance > range {
        return Err(IllegalAction::OutOfRange { distance, limit: range });
    }
    Ok(())
}

/// Check that `attacker` may make a basic attack on `target`.
pub fn check_attack(attacker: &Piece, target: &Piece) -> Result<(), IllegalAction> {
    check_target(attacker, target, attacker.range)
}

/// Squares `piece` could legally move to, in row-major order.
///
/// Only squares on the board are visited, so the cost is bounded by the
/// board size whatever the configured movement.
pub fn reachable_squares(board: &Board, piece: &Piece, first_move_bonus: u32) -> Vec<Position> {
    let reach = i32::try_from(piece.movement_allowance(first_move_bonus)).unwrap_or(i32::MAX);
    let origin = piece.position;
    let last_x = i32::try_from(board.width()).unwrap_or(i32::MAX).saturating_sub(1);
    let last_y = i32::try_from(board.height()).unwrap_or(i32::MAX).saturating_sub(1);
    let xs = origin.x.saturating_sub(reach).max(0)..=origin.x.saturating_add(reach).min(last_x);
    let ys = origin.y.saturating_sub(reach).max(0)..=origin.y.saturating_add(reach).min(last_y);

    let mut squares = Vec::new();
    for y in ys {
        for x in xs.clone() {
            let to = Position::new(x, y);
            if check_move(board, piece, to, first_move_bonus).is_ok() {
                squares.push(to);
            }
        }
    }
    squares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PieceStats;
    use crate::core::{Controller, ParticipantId, PieceId, TeamId, TeamMap};
    use crate::session::ManaPools;

    fn board_with(pieces: Vec<Piece>) -> Board {
        let controllers = TeamMap::from_vec(vec![
            Controller::Human(ParticipantId(1)),
            Controller::Human(ParticipantId(2)),
        ]);
        let mut board = Board::new(4, 4, controllers, Box::new(ManaPools::default()));
        for piece in pieces {
            board.add_piece(piece).unwrap();
        }
        board
    }

    fn piece(id: u32, team: u8, x: i32, y: i32) -> Piece {
        let stats = PieceStats::new(10, 3).with_range(2);
        Piece::from_stats(PieceId(id), "Pawn", TeamId(team), Position::new(x, y), None, &stats, 0)
    }

    #[test]
    fn test_move_checks() {
        let board = board_with(vec![piece(1, 0, 0, 0), piece(2, 1, 1, 0)]);
        let mover = board.piece(PieceId(1)).unwrap();

        assert!(check_move(&board, mover, Position::new(0, 1), 0).is_ok());
        assert!(check_move(&board, mover, Position::new(1, 1), 0).is_ok());
        assert_eq!(
            check_move(&board, mover, Position::new(1, 0), 0),
            Err(IllegalAction::Occupied(PieceId(2)))
        );
        assert_eq!(
            check_move(&board, mover, Position::new(-1, 0), 0),
            Err(IllegalAction::OutOfBounds)
        );
        assert_eq!(
            check_move(&board, mover, Position::new(0, 2), 0),
            Err(IllegalAction::OutOfRange { distance: 2, limit: 1 })
        );
    }

    #[test]
    fn test_first_move_bonus() {
        let board = board_with(vec![piece(1, 0, 0, 0)]);
        let mover = board.piece(PieceId(1)).unwrap();

        assert!(check_move(&board, mover, Position::new(0, 2), 1).is_ok());
        assert_eq!(reachable_squares(&board, mover, 0).len(), 3);
        assert_eq!(reachable_squares(&board, mover, 1).len(), 8);
    }

    #[test]
    fn test_huge_movement_stays_on_board() {
        let stats = PieceStats::new(10, 3).with_movement(u32::MAX);
        let runner = Piece::from_stats(PieceId(1), "Runner", TeamId(0), Position::new(1, 2), None, &stats, 0);
        let board = board_with(vec![runner, piece(2, 1, 3, 3)]);
        let runner = board.piece(PieceId(1)).unwrap();

        assert_eq!(runner.movement_allowance(u32::MAX), u32::MAX);
        let squares = reachable_squares(&board, runner, u32::MAX);
        // 16 squares, minus its own and the occupied one
        assert_eq!(squares.len(), 14);
        assert!(squares.iter().all(|&to| board.in_bounds(to)));
        assert!(check_move(&board, runner, Position::new(0, 0), u32::MAX).is_ok());
    }

    #[test]
    fn test_attack_checks() {
        let attacker = piece(1, 0, 0, 0);
        let ally = piece(2, 0, 1, 0);
        let near = piece(3, 1, 2, 2);
        let far = piece(4, 1, 3, 3);

        assert!(check_attack(&attacker, &near).is_ok());
        assert_eq!(check_attack(&attacker, &ally), Err(IllegalAction::FriendlyTarget(PieceId(2))));
        assert_eq!(
            check_attack(&attacker, &far),
            Err(IllegalAction::OutOfRange { distance: 3, limit: 2 })
        );

        let mut dead = near.clone();
        dead.apply_damage(100);
        assert_eq!(check_attack(&attacker, &dead), Err(IllegalAction::DeadTarget(PieceId(3))));
    }
}
