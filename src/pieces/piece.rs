//! Piece entity - mutable combat state.
//!
//! Invariants maintained by every mutator here:
//! - `hp <= max_hp`; at `hp == 0` the piece is dead and leaves the board.
//! - `shield_hp <= max_shield_hp`.
//! - Cooldowns are unsigned and tick toward zero; zero entries are dropped.
//! - `xp < xp_to_evolve` outside of evolution resolution, for types that
//!   can evolve (`xp_to_evolve > 0`).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::PieceStats;
use crate::core::{ParticipantId, PieceId, Position, TeamId};
use crate::error::{EngineError, Result};

/// Result of applying damage to a piece.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Damage soaked by the shield.
    pub absorbed: u32,
    /// HP actually lost.
    pub hp_lost: u32,
    /// The hit reduced HP to zero.
    pub killed: bool,
}

/// Lightweight reference carried by events and notifications.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceRef {
    /// Piece id.
    pub id: PieceId,
    /// Type at the time the reference was taken.
    pub piece_type: String,
    /// Owning team.
    pub team: TeamId,
    /// Owning participant.
    pub owner: Option<ParticipantId>,
}

/// A piece on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    /// Unique id.
    pub id: PieceId,
    /// Type key into the balance configuration.
    pub piece_type: String,
    /// Owning team.
    pub team: TeamId,
    /// Current square.
    pub position: Position,
    /// Owning participant (player or AI), if any.
    pub owner: Option<ParticipantId>,

    hp: u32,
    max_hp: u32,
    /// Basic attack damage.
    pub attack: u32,
    /// Basic attack range.
    pub range: u32,
    /// Squares per move.
    pub movement: u32,
    xp: u32,
    xp_to_evolve: u32,
    shield_hp: u32,
    max_shield_hp: u32,
    cooldowns: FxHashMap<String, u32>,
    first_move: bool,
}

impl Piece {
    /// Build a fresh piece from configured stats.
    ///
    /// XP and shield start at zero, cooldowns empty, first-move flag set.
    #[must_use]
    pub fn from_stats(
        id: PieceId,
        piece_type: impl Into<String>,
        team: TeamId,
        position: Position,
        owner: Option<ParticipantId>,
        stats: &PieceStats,
        xp_to_evolve: u32,
    ) -> Self {
        Self {
            id,
            piece_type: piece_type.into(),
            team,
            position,
            owner,
            hp: stats.hp,
            max_hp: stats.hp,
            attack: stats.attack,
            range: stats.range,
            movement: stats.movement,
            xp: 0,
            xp_to_evolve,
            shield_hp: 0,
            max_shield_hp: stats.max_shield_hp,
            cooldowns: FxHashMap::default(),
            first_move: true,
        }
    }

    /// A reference for events.
    #[must_use]
    pub fn to_ref(&self) -> PieceRef {
        PieceRef {
            id: self.id,
            piece_type: self.piece_type.clone(),
            team: self.team,
            owner: self.owner,
        }
    }

    // === Health ===

    /// Current HP.
    #[must_use]
    pub fn hp(&self) -> u32 {
        self.hp
    }

    /// HP cap.
    #[must_use]
    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// Check if the piece is still in play.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Write HP directly.
    ///
    /// Values outside `0..=max_hp` are rejected with `InvariantViolation`.
    pub fn set_hp(&mut self, hp: i64) -> Result<()> {
        if hp < 0 || hp > i64::from(self.max_hp) {
            return Err(EngineError::InvariantViolation(format!(
                "{} hp {} outside 0..={}",
                self.id, hp, self.max_hp
            )));
        }
        self.hp = hp as u32;
        Ok(())
    }

    /// Apply damage: shield absorbs first, the overflow comes off HP.
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        let absorbed = amount.min(self.shield_hp);
        self.shield_hp -= absorbed;

        let hp_lost = (amount - absorbed).min(self.hp);
        self.hp -= hp_lost;

        DamageOutcome {
            absorbed,
            hp_lost,
            killed: hp_lost > 0 && self.hp == 0,
        }
    }

    // === Shield ===

    /// Current shield.
    #[must_use]
    pub fn shield_hp(&self) -> u32 {
        self.shield_hp
    }

    /// Shield cap.
    #[must_use]
    pub fn max_shield_hp(&self) -> u32 {
        self.max_shield_hp
    }

    /// Add shield, clamped to the cap. Returns the amount actually gained.
    pub fn add_shield(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.max_shield_hp - self.shield_hp);
        self.shield_hp += gained;
        gained
    }

    // === Cooldowns ===

    /// Remaining cooldown for an ability (0 = ready).
    #[must_use]
    pub fn cooldown(&self, ability: &str) -> u32 {
        self.cooldowns.get(ability).copied().unwrap_or(0)
    }

    /// All running cooldowns.
    pub fn cooldowns(&self) -> impl Iterator<Item = (&str, u32)> {
        self.cooldowns.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Start an ability's cooldown.
    pub fn start_cooldown(&mut self, ability: &str, turns: u32) {
        if turns == 0 {
            self.cooldowns.remove(ability);
        } else {
            self.cooldowns.insert(ability.to_string(), turns);
        }
    }

    /// Decrement every cooldown by exactly one, dropping those that reach zero.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, turns| {
            *turns = turns.saturating_sub(1);
            *turns > 0
        });
    }

    // === Experience ===

    /// Current XP.
    #[must_use]
    pub fn xp(&self) -> u32 {
        self.xp
    }

    /// XP threshold for the next evolution (0 = never evolves).
    #[must_use]
    pub fn xp_to_evolve(&self) -> u32 {
        self.xp_to_evolve
    }

    /// Add XP. Evolution is resolved separately by the rules.
    pub fn gain_xp(&mut self, amount: u32) {
        self.xp = self.xp.saturating_add(amount);
    }

    /// Check if the piece has reached its evolution threshold.
    #[must_use]
    pub fn ready_to_evolve(&self) -> bool {
        self.xp_to_evolve > 0 && self.xp >= self.xp_to_evolve
    }

    /// Fraction of the way to the next evolution, in `0.0..=1.0`.
    #[must_use]
    pub fn evolution_progress(&self) -> f64 {
        if self.xp_to_evolve == 0 {
            return 0.0;
        }
        (f64::from(self.xp) / f64::from(self.xp_to_evolve)).min(1.0)
    }

    /// Hold XP just below the threshold (used when no evolution exists).
    pub fn cap_xp_below_threshold(&mut self) {
        if self.xp_to_evolve > 0 {
            self.xp = self.xp.min(self.xp_to_evolve - 1);
        }
    }

    /// Become `new_type` with the given stats.
    ///
    /// Caps and base stats are replaced; current HP and shield are clamped
    /// to the new caps (never refilled); XP beyond the old threshold carries
    /// forward.
    pub fn evolve_into(&mut self, new_type: &str, stats: &PieceStats, new_xp_to_evolve: u32) {
        self.xp = self.xp.saturating_sub(self.xp_to_evolve);
        self.piece_type = new_type.to_string();
        self.max_hp = stats.hp;
        self.hp = self.hp.min(self.max_hp);
        self.attack = stats.attack;
        self.range = stats.range;
        self.movement = stats.movement;
        self.xp_to_evolve = new_xp_to_evolve;
        self.max_shield_hp = stats.max_shield_hp;
        self.shield_hp = self.shield_hp.min(self.max_shield_hp);
    }

    // === Movement ===

    /// Check if the piece has not moved yet.
    #[must_use]
    pub fn is_first_move(&self) -> bool {
        self.first_move
    }

    /// Movement allowance for the next move.
    #[must_use]
    pub fn movement_allowance(&self, first_move_bonus: u32) -> u32 {
        if self.first_move {
            self.movement.saturating_add(first_move_bonus)
        } else {
            self.movement
        }
    }

    /// Relocate, clearing the first-move flag.
    pub fn move_to(&mut self, to: Position) {
        self.position = to;
        self.first_move = false;
    }
}
