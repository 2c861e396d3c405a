//! Shield regeneration.
//!
//! Kings regenerate `base_regen + proximity_bonus(d1, d2)` per tick, where
//! `d1`/`d2` count allies at exactly distance 1 and 2. Every other piece
//! gains `ally_neighbor_contribution` for each adjacent non-king ally.
//! Gains are always clamped to the piece's shield cap.

use crate::config::ShieldSystem;
use crate::core::{PieceId, TeamId};
use crate::pieces::Piece;
use crate::session::Board;

/// Ally counts around a piece.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighborhood {
    /// Allies at distance 1.
    pub allies_at_1: usize,
    /// Allies at distance 2.
    pub allies_at_2: usize,
    /// Non-king allies at distance 1.
    pub contributors: usize,
}

impl Neighborhood {
    /// Count the allies around `piece`.
    pub fn around<'a>(piece: &Piece, others: impl Iterator<Item = &'a Piece>, king_type: &str) -> Self {
        let mut hood = Self::default();
        for other in others {
            if other.id == piece.id || other.team != piece.team || !other.is_alive() {
                continue;
            }
            match piece.position.distance(other.position) {
                1 => {
                    hood.allies_at_1 += 1;
                    if other.piece_type != king_type {
                        hood.contributors += 1;
                    }
                }
                2 => hood.allies_at_2 += 1,
                _ => {}
            }
        }
        hood
    }
}

/// Uncapped regen amount for one tick.
#[must_use]
pub fn regen_amount(system: &ShieldSystem, is_king: bool, hood: Neighborhood) -> u32 {
    if is_king {
        system.base_regen + system.proximity_bonus(hood.allies_at_1, hood.allies_at_2)
    } else {
        system
            .ally_neighbor_contribution
            .saturating_mul(hood.contributors as u32)
    }
}

/// Regenerate shields for every piece on `team`.
///
/// Amounts are computed from positions before any shield changes, so the
/// result does not depend on iteration order. Returns the pieces that gained
/// shield and how much.
pub fn regenerate_shields(board: &mut Board, system: &ShieldSystem, team: TeamId) -> Vec<(PieceId, u32)> {
    let planned: Vec<(PieceId, u32)> = board
        .pieces_of(team)
        .filter(|p| p.max_shield_hp() > 0)
        .map(|p| {
            let hood = Neighborhood::around(p, board.pieces(), &system.king_type);
            (p.id, regen_amount(system, p.piece_type == system.king_type, hood))
        })
        .filter(|(_, amount)| *amount > 0)
        .collect();

    let mut gained = Vec::with_capacity(planned.len());
    for (id, amount) in planned {
        if let Some(piece) = board.piece_mut(id) {
            let added = piece.add_shield(amount);
            if added > 0 {
                gained.push((id, added));
            }
        }
    }
    gained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PieceStats;
    use crate::core::{Controller, ParticipantId, Position, TeamMap};
    use crate::session::ManaPools;

    fn system() -> ShieldSystem {
        ShieldSystem {
            king_type: "King".into(),
            base_regen: 1,
            proximity_bonus_distance1: vec![0, 1, 2],
            proximity_bonus_distance2: vec![0, 1],
            ally_neighbor_contribution: 2,
        }
    }

    fn piece(id: u32, ty: &str, team: u8, x: i32, y: i32) -> Piece {
        let stats = PieceStats::new(10, 1).with_max_shield(5);
        Piece::from_stats(PieceId(id), ty, TeamId(team), Position::new(x, y), None, &stats, 0)
    }

    fn board(pieces: Vec<Piece>) -> Board {
        let controllers = TeamMap::from_vec(vec![
            Controller::Human(ParticipantId(1)),
            Controller::Human(ParticipantId(2)),
        ]);
        let mut board = Board::new(8, 8, controllers, Box::new(ManaPools::default()));
        for p in pieces {
            board.add_piece(p).unwrap();
        }
        board
    }

    #[test]
    fn test_king_regen_uses_proximity_tables() {
        let system = system();
        let hood = Neighborhood { allies_at_1: 2, allies_at_2: 5, contributors: 2 };
        assert_eq!(regen_amount(&system, true, hood), 1 + 2 + 1);
        assert_eq!(regen_amount(&system, true, Neighborhood::default()), 1);
    }

    #[test]
    fn test_neighbor_contribution() {
        let system = system();
        let hood = Neighborhood { allies_at_1: 3, allies_at_2: 0, contributors: 2 };
        assert_eq!(regen_amount(&system, false, hood), 4);
    }

    #[test]
    fn test_regenerate_clamps_and_ignores_enemies() {
        let mut board = board(vec![
            piece(1, "King", 0, 3, 3),
            piece(2, "Pawn", 0, 3, 4),
            piece(3, "Pawn", 0, 4, 4),
            piece(4, "Pawn", 0, 5, 3),
            piece(5, "Pawn", 1, 2, 2),
        ]);

        let gained = regenerate_shields(&mut board, &system(), TeamId(0));

        // King: 1 base + 2 (two at d1) + 1 (one at d2).
        assert_eq!(board.piece(PieceId(1)).unwrap().shield_hp(), 4);
        // Pawn 2 neighbours pawn 3 (the king does not contribute).
        assert_eq!(board.piece(PieceId(2)).unwrap().shield_hp(), 2);
        // Pawn 3 neighbours pawns 2 and 4: 4.
        assert_eq!(board.piece(PieceId(3)).unwrap().shield_hp(), 4);
        assert_eq!(board.piece(PieceId(5)).unwrap().shield_hp(), 0);
        assert_eq!(gained.len(), 4);

        regenerate_shields(&mut board, &system(), TeamId(0));
        assert_eq!(board.piece(PieceId(1)).unwrap().shield_hp(), 5);
        assert_eq!(board.piece(PieceId(3)).unwrap().shield_hp(), 5);
    }
}
