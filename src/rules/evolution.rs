//! Evolution resolution.
//!
//! A piece evolves once `xp >= xp_to_evolve`. The next type is the first
//! candidate of its evolution rule that exists in the piece table. XP beyond
//! the threshold carries forward, so a large XP gain can chain several
//! evolutions in one pass. A piece with no usable candidate (a final rank)
//! has its XP held just below the threshold.

use tracing::debug;

use crate::config::BalanceConfig;
use crate::core::PieceId;
use crate::error::Result;
use crate::pieces::Piece;

/// One evolution step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evolution {
    /// Piece that evolved.
    pub piece: PieceId,
    /// Type before the step.
    pub from: String,
    /// Type after the step.
    pub to: String,
}

/// The type `piece_type` would evolve into, if any.
#[must_use]
pub fn next_type<'c>(config: &'c BalanceConfig, piece_type: &str) -> Option<&'c str> {
    config
        .evolution
        .candidates(piece_type)
        .iter()
        .find(|c| config.pieces.contains_key(c.as_str()))
        .map(String::as_str)
}

/// Evolve `piece` as many times as its XP allows.
///
/// Returns the steps taken, in order (empty if the piece was not ready).
pub fn resolve_evolution(piece: &mut Piece, config: &BalanceConfig) -> Result<Vec<Evolution>> {
    let mut steps = Vec::new();

    while piece.ready_to_evolve() {
        let Some(to) = next_type(config, &piece.piece_type) else {
            piece.cap_xp_below_threshold();
            break;
        };

        let stats = config.piece_stats(to)?;
        let threshold = config.xp_to_evolve(to)?;
        let from = piece.piece_type.clone();
        piece.evolve_into(to, stats, threshold);

        debug!(piece = %piece.id, from = %from, to, xp = piece.xp(), "Piece evolved");
        steps.push(Evolution {
            piece: piece.id,
            from,
            to: to.to_string(),
        });
    }

    Ok(steps)
}

/// Evolve `piece` now if its type is flagged immediate-on-last-rank.
///
/// Other types wait for their side's next tick.
pub fn resolve_immediate(piece: &mut Piece, config: &BalanceConfig) -> Result<Vec<Evolution>> {
    if config.evolution.is_immediate(&piece.piece_type) {
        resolve_evolution(piece, config)
    } else {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PieceStats;
    use crate::core::{Position, TeamId};

    fn config() -> BalanceConfig {
        BalanceConfig::new()
            .with_piece("Pawn", PieceStats::new(10, 1).with_xp_to_evolve(5))
            .with_piece("Knight", PieceStats::new(8, 3).with_xp_to_evolve(10).with_max_shield(2))
            .with_piece("Paladin", PieceStats::new(30, 5))
            .with_evolution("Pawn", &["Dragon", "Knight"])
            .with_evolution("Knight", &["Paladin"])
    }

    fn pawn(config: &BalanceConfig) -> Piece {
        let stats = config.piece_stats("Pawn").unwrap();
        Piece::from_stats(PieceId(1), "Pawn", TeamId(0), Position::new(0, 0), None, stats, 5)
    }

    #[test]
    fn test_not_ready() {
        let config = config();
        let mut piece = pawn(&config);
        piece.gain_xp(4);
        assert!(resolve_evolution(&mut piece, &config).unwrap().is_empty());
        assert_eq!(piece.piece_type, "Pawn");
    }

    #[test]
    fn test_skips_unconfigured_candidate_and_clamps_hp() {
        let config = config();
        let mut piece = pawn(&config);
        piece.gain_xp(7);

        let steps = resolve_evolution(&mut piece, &config).unwrap();

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].to, "Knight");
        assert_eq!(piece.piece_type, "Knight");
        assert_eq!(piece.hp(), 8);
        assert_eq!(piece.attack, 3);
        assert_eq!(piece.xp(), 2);
        assert_eq!(piece.xp_to_evolve(), 10);
    }

    #[test]
    fn test_damaged_hp_is_not_refilled() {
        let config = config();
        let mut piece = pawn(&config);
        piece.apply_damage(6);
        piece.gain_xp(5);

        resolve_evolution(&mut piece, &config).unwrap();
        assert_eq!(piece.hp(), 4);
        assert_eq!(piece.max_hp(), 8);
    }

    #[test]
    fn test_chained_evolution() {
        let config = config();
        let mut piece = pawn(&config);
        piece.gain_xp(16);

        let steps = resolve_evolution(&mut piece, &config).unwrap();

        let path: Vec<_> = steps.iter().map(|s| s.to.as_str()).collect();
        assert_eq!(path, vec!["Knight", "Paladin"]);
        assert_eq!(piece.xp(), 1);
        assert_eq!(piece.xp_to_evolve(), 0);
    }

    #[test]
    fn test_final_rank_caps_xp() {
        let config = BalanceConfig::new().with_piece("Pawn", PieceStats::new(10, 1).with_xp_to_evolve(5));
        let mut piece = pawn(&config);
        piece.gain_xp(9);

        assert!(resolve_evolution(&mut piece, &config).unwrap().is_empty());
        assert_eq!(piece.xp(), 4);
    }

    #[test]
    fn test_immediate_only_when_flagged() {
        let mut config = config();
        let mut piece = pawn(&config);
        piece.gain_xp(5);
        assert!(resolve_immediate(&mut piece, &config).unwrap().is_empty());

        config.evolution.immediate_on_last_rank.push("Pawn".into());
        assert_eq!(resolve_immediate(&mut piece, &config).unwrap().len(), 1);
    }
}
