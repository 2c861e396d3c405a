//! AI tuning parameters.

use serde::{Deserialize, Serialize};

/// Ranking weights and tie-break seed for the AI turn service.
///
/// Lives under the `ai` key of the balance payload, so designers can retune
/// the AI without a code change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiConfig {
    /// Seed for tie-breaking between equally scored actions.
    /// Same seed and same board produce the same turn.
    pub seed: u64,

    /// Scales the bonus for kills by pieces close to evolving.
    pub evolution_weight: f64,

    /// Scales the bonus for lethal hits (multiplied by the kill reward).
    pub kill_weight: f64,

    /// Base score for using an ability.
    pub ability_weight: f64,

    /// Base score for a basic attack.
    pub attack_weight: f64,

    /// Score per square closed toward the nearest enemy.
    pub advance_weight: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            evolution_weight: 2.0,
            kill_weight: 4.0,
            ability_weight: 1.5,
            attack_weight: 1.0,
            advance_weight: 0.25,
        }
    }
}

impl AiConfig {
    /// Set the tie-break seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the evolution weight.
    #[must_use]
    pub fn with_evolution_weight(mut self, weight: f64) -> Self {
        self.evolution_weight = weight;
        self
    }

    /// Set the kill weight.
    #[must_use]
    pub fn with_kill_weight(mut self, weight: f64) -> Self {
        self.kill_weight = weight;
        self
    }

    /// Set the ability weight.
    #[must_use]
    pub fn with_ability_weight(mut self, weight: f64) -> Self {
        self.ability_weight = weight;
        self
    }

    /// Set the attack weight.
    #[must_use]
    pub fn with_attack_weight(mut self, weight: f64) -> Self {
        self.attack_weight = weight;
        self
    }

    /// Set the advance weight.
    #[must_use]
    pub fn with_advance_weight(mut self, weight: f64) -> Self {
        self.advance_weight = weight;
        self
    }
}
