//! Participant mana ledger.
//!
//! Mana belongs to participants, not pieces. The ledger is a collaborator
//! boundary: hosts that keep mana elsewhere implement [`ManaLedger`];
//! [`ManaPools`] is the in-memory default.

use rustc_hash::FxHashMap;

use crate::core::ParticipantId;
use crate::error::IllegalAction;

/// Per-participant mana pools read and mutated by ability rules.
pub trait ManaLedger: Send + std::fmt::Debug {
    /// Current pool (0 for unknown participants).
    fn balance(&self, participant: ParticipantId) -> u32;

    /// Deduct `amount`, failing without change if the pool is short.
    fn spend(&mut self, participant: ParticipantId, amount: u32) -> Result<(), IllegalAction>;

    /// Add up to `amount` without exceeding `cap`. Returns the amount added.
    fn grant(&mut self, participant: ParticipantId, amount: u32, cap: u32) -> u32;
}

/// In-memory [`ManaLedger`].
#[derive(Clone, Debug, Default)]
pub struct ManaPools {
    pools: FxHashMap<ParticipantId, u32>,
}

impl ManaPools {
    /// Create pools for the given participants, each starting at `starting`.
    pub fn new(starting: u32, participants: impl IntoIterator<Item = ParticipantId>) -> Self {
        Self {
            pools: participants.into_iter().map(|p| (p, starting)).collect(),
        }
    }
}

impl ManaLedger for ManaPools {
    fn balance(&self, participant: ParticipantId) -> u32 {
        self.pools.get(&participant).copied().unwrap_or(0)
    }

    fn spend(&mut self, participant: ParticipantId, amount: u32) -> Result<(), IllegalAction> {
        let available = self.balance(participant);
        if available < amount {
            return Err(IllegalAction::InsufficientMana {
                needed: amount,
                available,
            });
        }
        self.pools.insert(participant, available - amount);
        Ok(())
    }

    fn grant(&mut self, participant: ParticipantId, amount: u32, cap: u32) -> u32 {
        let pool = self.pools.entry(participant).or_insert(0);
        let added = amount.min(cap.saturating_sub(*pool));
        *pool += added;
        added
    }
}
