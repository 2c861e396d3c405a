//! Ability legality and application.
//!
//! An ability use is legal when:
//! - the caster's type lists the ability and the ability is configured,
//! - the target is a live enemy within the ability's range,
//! - the ability's cooldown is 0,
//! - the caster's owning participant can pay the mana cost.
//!
//! Applying it pays the cost, starts the cooldown, then deals damage to the
//! target (or to every enemy within `aoe_radius` of it for AoE abilities).

use smallvec::SmallVec;

use super::movement::check_target;
use crate::config::{AbilitySpec, BalanceConfig};
use crate::core::{ParticipantId, PieceId};
use crate::error::{EngineError, IllegalAction, Result};
use crate::pieces::{DamageOutcome, Piece};
use crate::session::Board;

/// Damage dealt to one piece by an attack or ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    /// Piece that was hit.
    pub target: PieceId,
    /// What the damage did.
    pub outcome: DamageOutcome,
}

/// Check an ability use and return its spec.
///
/// Configuration misses (the caster's type or the ability itself) are
/// `ConfigurationLookup` errors; everything else is an `IllegalAction`.
pub fn check_ability<'c>(
    config: &'c BalanceConfig,
    board: &Board,
    caster: &Piece,
    ability: &str,
    target: &Piece,
) -> Result<&'c AbilitySpec> {
    let stats = config.piece_stats(&caster.piece_type)?;
    if !stats.abilities.iter().any(|a| a == ability) {
        return Err(IllegalAction::AbilityNotKnown(ability.to_string()).into());
    }
    let spec = config.ability(ability)?;

    check_target(caster, target, spec.range)?;

    let remaining = caster.cooldown(ability);
    if remaining > 0 {
        return Err(IllegalAction::CooldownNotReady {
            ability: ability.to_string(),
            remaining,
        }
        .into());
    }

    let owner = caster.owner.ok_or(IllegalAction::NoManaPool)?;
    let available = board.mana(owner);
    if available < spec.mp_cost {
        return Err(IllegalAction::InsufficientMana {
            needed: spec.mp_cost,
            available,
        }
        .into());
    }

    Ok(spec)
}

/// Pieces an ability centred on `target` would hit, in id order.
pub fn affected_pieces(board: &Board, caster: &Piece, spec: &AbilitySpec, target: &Piece) -> Vec<PieceId> {
    if !spec.aoe {
        return vec![target.id];
    }
    board
        .pieces()
        .filter(|p| p.team != caster.team && p.is_alive())
        .filter(|p| p.position.distance(target.position) <= spec.aoe_radius)
        .map(|p| p.id)
        .collect()
}

/// Apply a checked ability use.
///
/// Call only after [`check_ability`] succeeded on the same board.
pub fn apply_ability(
    board: &mut Board,
    caster_id: PieceId,
    ability: &str,
    spec: &AbilitySpec,
    target_id: PieceId,
) -> Result<SmallVec<[Hit; 4]>> {
    let (owner, affected) = {
        let caster = board
            .piece(caster_id)
            .ok_or(IllegalAction::UnknownPiece(caster_id))?;
        let target = board
            .piece(target_id)
            .ok_or(IllegalAction::UnknownPiece(target_id))?;
        let owner: ParticipantId = caster.owner.ok_or(IllegalAction::NoManaPool)?;
        (owner, affected_pieces(board, caster, spec, target))
    };

    board.mana_ledger().spend(owner, spec.mp_cost)?;
    if let Some(caster) = board.piece_mut(caster_id) {
        caster.start_cooldown(ability, spec.cooldown);
    }

    let mut hits = SmallVec::with_capacity(affected.len());
    for id in affected {
        let piece = board
            .piece_mut(id)
            .ok_or_else(|| EngineError::InvariantViolation(format!("{id} vanished mid-ability")))?;
        hits.push(Hit {
            target: id,
            outcome: piece.apply_damage(spec.damage),
        });
    }
    Ok(hits)
}
