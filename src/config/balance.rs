//! Balance configuration snapshot.
//!
//! A `BalanceConfig` is the parsed JSON payload of a configuration version.
//! It is immutable once resolved; sessions hold it behind an `Arc`.
//!
//! ## Payload schema
//!
//! ```json
//! {
//!   "globals":      { "manaRegenPerTurn": 2, "cooldownTick": "startOfTurn" },
//!   "playerMana":   { "starting": 10, "max": 20 },
//!   "pieces":       { "Pawn": { "hp": 10, "attack": 2, "range": 1, "movement": 1 } },
//!   "abilities":    { "Fireball": { "mpCost": 5, "cooldown": 3, "range": 3, "damage": 4 } },
//!   "evolution":    { "rules": [{ "from": "Pawn", "to": ["Knight"] }] },
//!   "ai":           { "seed": 7 },
//!   "shieldSystem": { "kingType": "King", "baseRegen": 1 },
//!   "killRewards":  { "Pawn": { "xp": 2, "mana": 1 } }
//! }
//! ```
//!
//! Every section is optional and falls back to its default. Piece types and
//! abilities are looked up by exact key; a miss is always an error.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ai::AiConfig;
use crate::error::{EngineError, Result};

/// Complete balance configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BalanceConfig {
    /// Turn-level rules.
    pub globals: GlobalRules,

    /// Mana pool limits per participant.
    pub player_mana: PlayerManaRules,

    /// Per-piece-type base stats.
    pub pieces: FxHashMap<String, PieceStats>,

    /// Per-ability specs.
    pub abilities: FxHashMap<String, AbilitySpec>,

    /// Evolution graph and thresholds.
    pub evolution: EvolutionRules,

    /// AI tuning knobs.
    pub ai: AiConfig,

    /// Shield regeneration parameters.
    pub shield_system: ShieldSystem,

    /// Rewards for killing a piece, keyed by the victim's type.
    pub kill_rewards: FxHashMap<String, KillReward>,
}

impl BalanceConfig {
    /// Create an empty configuration with default globals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON payload.
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Serialize to a JSON payload.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Stats for a piece type.
    pub fn piece_stats(&self, piece_type: &str) -> Result<&PieceStats> {
        self.pieces
            .get(piece_type)
            .ok_or_else(|| EngineError::unknown_piece_type(piece_type))
    }

    /// Spec for an ability.
    pub fn ability(&self, name: &str) -> Result<&AbilitySpec> {
        self.abilities
            .get(name)
            .ok_or_else(|| EngineError::unknown_ability(name))
    }

    /// XP needed for a piece type to evolve.
    ///
    /// `evolution.thresholds` overrides the piece table's `xpToEvolve`.
    pub fn xp_to_evolve(&self, piece_type: &str) -> Result<u32> {
        let stats = self.piece_stats(piece_type)?;
        Ok(self
            .evolution
            .thresholds
            .get(piece_type)
            .copied()
            .unwrap_or(stats.xp_to_evolve))
    }

    /// Reward for killing a piece of this type, if one is configured.
    #[must_use]
    pub fn kill_reward(&self, piece_type: &str) -> Option<&KillReward> {
        self.kill_rewards.get(piece_type)
    }

    /// Check if a piece type is the shield system's king.
    #[must_use]
    pub fn is_king(&self, piece_type: &str) -> bool {
        self.shield_system.king_type == piece_type
    }

    /// Add a piece type.
    #[must_use]
    pub fn with_piece(mut self, name: impl Into<String>, stats: PieceStats) -> Self {
        self.pieces.insert(name.into(), stats);
        self
    }

    /// Add an ability.
    #[must_use]
    pub fn with_ability(mut self, name: impl Into<String>, spec: AbilitySpec) -> Self {
        self.abilities.insert(name.into(), spec);
        self
    }

    /// Add an evolution rule.
    #[must_use]
    pub fn with_evolution(mut self, from: impl Into<String>, to: &[&str]) -> Self {
        self.evolution.rules.push(EvolutionRule {
            from: from.into(),
            to: to.iter().map(|s| (*s).to_string()).collect(),
        });
        self
    }

    /// Add a kill reward.
    #[must_use]
    pub fn with_kill_reward(mut self, victim_type: impl Into<String>, xp: u32, mana: u32) -> Self {
        self.kill_rewards.insert(victim_type.into(), KillReward { xp, mana });
        self
    }

    /// Replace the global rules.
    #[must_use]
    pub fn with_globals(mut self, globals: GlobalRules) -> Self {
        self.globals = globals;
        self
    }

    /// Replace the shield system parameters.
    #[must_use]
    pub fn with_shield_system(mut self, shield_system: ShieldSystem) -> Self {
        self.shield_system = shield_system;
        self
    }

    /// Replace the AI tuning.
    #[must_use]
    pub fn with_ai(mut self, ai: AiConfig) -> Self {
        self.ai = ai;
        self
    }
}

/// When ability cooldowns tick down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CooldownTick {
    /// At `begin_turn` of the owning side.
    #[default]
    StartOfTurn,
    /// At `end_turn` of the owning side.
    EndOfTurn,
}

/// Turn-level rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalRules {
    /// Mana granted to the mover's participant at the start of each turn.
    pub mana_regen_per_turn: u32,

    /// Single tick phase shared by every ability.
    pub cooldown_tick: CooldownTick,

    /// Board columns.
    pub board_width: u32,

    /// Board rows.
    pub board_height: u32,

    /// Extra movement allowed on a piece's first move.
    pub first_move_bonus: u32,
}

impl Default for GlobalRules {
    fn default() -> Self {
        Self {
            mana_regen_per_turn: 1,
            cooldown_tick: CooldownTick::StartOfTurn,
            board_width: 8,
            board_height: 8,
            first_move_bonus: 0,
        }
    }
}

/// Mana pool limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerManaRules {
    /// Pool size at session start.
    pub starting: u32,
    /// Regeneration never raises a pool above this.
    pub max: u32,
}

impl Default for PlayerManaRules {
    fn default() -> Self {
        Self {
            starting: 10,
            max: 20,
        }
    }
}

/// Base stats for a piece type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PieceStats {
    /// Hit points (also the HP cap).
    pub hp: u32,
    /// Basic attack damage.
    pub attack: u32,
    /// Basic attack range.
    pub range: u32,
    /// Squares per move.
    pub movement: u32,
    /// XP needed to evolve. 0 means the type never evolves.
    pub xp_to_evolve: u32,
    /// Shield cap.
    pub max_shield_hp: u32,
    /// Abilities this type may use.
    pub abilities: Vec<String>,
}

impl PieceStats {
    /// Create stats with the given HP and attack, range and movement 1.
    #[must_use]
    pub fn new(hp: u32, attack: u32) -> Self {
        Self {
            hp,
            attack,
            range: 1,
            movement: 1,
            ..Self::default()
        }
    }

    /// Set attack range.
    #[must_use]
    pub fn with_range(mut self, range: u32) -> Self {
        self.range = range;
        self
    }

    /// Set movement allowance.
    #[must_use]
    pub fn with_movement(mut self, movement: u32) -> Self {
        self.movement = movement;
        self
    }

    /// Set the evolution threshold.
    #[must_use]
    pub fn with_xp_to_evolve(mut self, xp: u32) -> Self {
        self.xp_to_evolve = xp;
        self
    }

    /// Set the shield cap.
    #[must_use]
    pub fn with_max_shield(mut self, max_shield_hp: u32) -> Self {
        self.max_shield_hp = max_shield_hp;
        self
    }

    /// Allow an ability.
    #[must_use]
    pub fn with_ability(mut self, ability: impl Into<String>) -> Self {
        self.abilities.push(ability.into());
        self
    }
}

/// Ability spec.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AbilitySpec {
    /// Mana cost, paid by the caster's owning participant.
    pub mp_cost: u32,
    /// Turns before the ability can be used again.
    pub cooldown: u32,
    /// Maximum distance from caster to primary target.
    pub range: u32,
    /// Hits every enemy within `aoe_radius` of the primary target.
    pub aoe: bool,
    /// Splash radius for AoE abilities.
    pub aoe_radius: u32,
    /// Damage dealt to each affected piece.
    pub damage: u32,
}

impl Default for AbilitySpec {
    fn default() -> Self {
        Self {
            mp_cost: 0,
            cooldown: 0,
            range: 1,
            aoe: false,
            aoe_radius: 1,
            damage: 0,
        }
    }
}

impl AbilitySpec {
    /// Create a single-target ability.
    #[must_use]
    pub fn new(mp_cost: u32, cooldown: u32, range: u32, damage: u32) -> Self {
        Self {
            mp_cost,
            cooldown,
            range,
            damage,
            ..Self::default()
        }
    }

    /// Make this an area-of-effect ability.
    #[must_use]
    pub fn area(mut self, radius: u32) -> Self {
        self.aoe = true;
        self.aoe_radius = radius;
        self
    }
}

/// One edge of the evolution graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionRule {
    /// Current type.
    pub from: String,
    /// Candidate next types, in preference order.
    pub to: Vec<String>,
}

/// Evolution graph, threshold overrides, and immediate flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvolutionRules {
    /// Evolution edges.
    pub rules: Vec<EvolutionRule>,
    /// Per-type XP threshold overrides.
    pub thresholds: FxHashMap<String, u32>,
    /// Types whose evolution applies as soon as the threshold is crossed.
    pub immediate_on_last_rank: Vec<String>,
}

impl EvolutionRules {
    /// Candidate next types for `from`, empty if it is a final rank.
    #[must_use]
    pub fn candidates(&self, from: &str) -> &[String] {
        self.rules
            .iter()
            .find(|r| r.from == from)
            .map_or(&[], |r| r.to.as_slice())
    }

    /// Check if `to` is a permitted evolution of `from`.
    #[must_use]
    pub fn permits(&self, from: &str, to: &str) -> bool {
        self.candidates(from).iter().any(|c| c == to)
    }

    /// Check if evolution for this type skips the tick wait.
    #[must_use]
    pub fn is_immediate(&self, piece_type: &str) -> bool {
        self.immediate_on_last_rank.iter().any(|t| t == piece_type)
    }
}

/// Shield regeneration parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShieldSystem {
    /// The piece type that receives king regeneration.
    pub king_type: String,
    /// King regen per tick before proximity bonuses.
    pub base_regen: u32,
    /// Bonus indexed by the number of allies at distance 1.
    pub proximity_bonus_distance1: Vec<u32>,
    /// Bonus indexed by the number of allies at distance 2.
    pub proximity_bonus_distance2: Vec<u32>,
    /// Shield each adjacent non-king ally contributes per tick.
    pub ally_neighbor_contribution: u32,
}

impl Default for ShieldSystem {
    fn default() -> Self {
        Self {
            king_type: "King".to_string(),
            base_regen: 0,
            proximity_bonus_distance1: Vec::new(),
            proximity_bonus_distance2: Vec::new(),
            ally_neighbor_contribution: 0,
        }
    }
}

impl ShieldSystem {
    /// King proximity bonus for the given ally counts.
    ///
    /// Counts past the end of a table use its last entry; an empty table
    /// contributes nothing.
    #[must_use]
    pub fn proximity_bonus(&self, at_distance1: usize, at_distance2: usize) -> u32 {
        fn lookup(table: &[u32], count: usize) -> u32 {
            table
                .get(count)
                .or_else(|| table.last())
                .copied()
                .unwrap_or(0)
        }
        lookup(&self.proximity_bonus_distance1, at_distance1)
            + lookup(&self.proximity_bonus_distance2, at_distance2)
    }
}

/// Reward for a kill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KillReward {
    /// XP granted to the killing piece.
    pub xp: u32,
    /// Mana granted to the killer's owning participant.
    pub mana: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "globals": { "manaRegenPerTurn": 2, "cooldownTick": "endOfTurn", "boardWidth": 10 },
        "playerMana": { "starting": 5, "max": 15 },
        "pieces": {
            "Pawn": { "hp": 10, "attack": 2, "range": 1, "movement": 1, "xpToEvolve": 10 },
            "Knight": { "hp": 20, "attack": 4, "range": 1, "movement": 2, "maxShieldHp": 5 }
        },
        "abilities": { "Fireball": { "mpCost": 5, "cooldown": 3, "range": 3, "aoe": true, "damage": 4 } },
        "evolution": {
            "rules": [{ "from": "Pawn", "to": ["Knight"] }],
            "thresholds": { "Pawn": 8 },
            "immediateOnLastRank": ["Pawn"]
        },
        "shieldSystem": { "kingType": "King", "baseRegen": 2, "proximityBonusDistance1": [0, 1, 3] },
        "killRewards": { "Pawn": { "xp": 3, "mana": 1 } }
    }"#;

    #[test]
    fn test_parse_payload() {
        let config = BalanceConfig::from_json(PAYLOAD).unwrap();

        assert_eq!(config.globals.mana_regen_per_turn, 2);
        assert_eq!(config.globals.cooldown_tick, CooldownTick::EndOfTurn);
        assert_eq!(config.globals.board_width, 10);
        assert_eq!(config.globals.board_height, 8); // default
        assert_eq!(config.player_mana.max, 15);

        let pawn = config.piece_stats("Pawn").unwrap();
        assert_eq!((pawn.hp, pawn.attack), (10, 2));

        let fireball = config.ability("Fireball").unwrap();
        assert!(fireball.aoe);
        assert_eq!(fireball.aoe_radius, 1); // default

        assert_eq!(config.kill_reward("Pawn"), Some(&KillReward { xp: 3, mana: 1 }));
        assert_eq!(config.kill_reward("Knight"), None);
    }

    #[test]
    fn test_empty_payload_uses_defaults() {
        let config = BalanceConfig::from_json("{}").unwrap();
        assert!(config.pieces.is_empty());
        assert_eq!(config.globals, GlobalRules::default());
        assert_eq!(config.shield_system.king_type, "King");
    }

    #[test]
    fn test_lookup_miss_is_error() {
        let config = BalanceConfig::from_json(PAYLOAD).unwrap();

        match config.piece_stats("Dragon") {
            Err(EngineError::ConfigurationLookup { kind, key }) => {
                assert_eq!(kind, "piece type");
                assert_eq!(key, "Dragon");
            }
            other => panic!("expected lookup error, got {other:?}"),
        }
        assert!(config.ability("Meteor").is_err());
        assert!(config.xp_to_evolve("Dragon").is_err());
    }

    #[test]
    fn test_threshold_override() {
        let config = BalanceConfig::from_json(PAYLOAD).unwrap();
        assert_eq!(config.xp_to_evolve("Pawn").unwrap(), 8);
        assert_eq!(config.xp_to_evolve("Knight").unwrap(), 0);
    }

    #[test]
    fn test_evolution_queries() {
        let config = BalanceConfig::from_json(PAYLOAD).unwrap();

        assert_eq!(config.evolution.candidates("Pawn"), &["Knight".to_string()]);
        assert!(config.evolution.candidates("Knight").is_empty());
        assert!(config.evolution.permits("Pawn", "Knight"));
        assert!(!config.evolution.permits("Knight", "Pawn"));
        assert!(config.evolution.is_immediate("Pawn"));
    }

    #[test]
    fn test_proximity_bonus_saturates() {
        let shields = ShieldSystem {
            proximity_bonus_distance1: vec![0, 1, 3],
            proximity_bonus_distance2: vec![0, 1],
            ..ShieldSystem::default()
        };

        assert_eq!(shields.proximity_bonus(0, 0), 0);
        assert_eq!(shields.proximity_bonus(2, 0), 3);
        assert_eq!(shields.proximity_bonus(9, 9), 4);
        assert_eq!(ShieldSystem::default().proximity_bonus(5, 5), 0);
    }

    #[test]
    fn test_builder_round_trips_through_json() {
        let config = BalanceConfig::new()
            .with_piece("Pawn", PieceStats::new(10, 2).with_xp_to_evolve(5))
            .with_ability("Fireball", AbilitySpec::new(5, 3, 3, 4).area(2))
            .with_evolution("Pawn", &["Knight", "Bishop"])
            .with_kill_reward("Pawn", 2, 1);

        let json = config.to_json().unwrap();
        let parsed = BalanceConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
