//! Balance configuration: schema, versioning, and the cached provider.
//!
//! - [`BalanceConfig`]: the parsed, immutable snapshot every rule reads.
//! - [`VersionStore`]: persistence boundary for Draft/Published/Active versions.
//! - [`ConfigVersioning`]: create, edit and publish versions.
//! - [`ConfigProvider`]: resolves and caches the Active snapshot.

pub mod balance;
pub mod version;
pub mod provider;
pub mod versioning;

pub use balance::{
    AbilitySpec, BalanceConfig, CooldownTick, EvolutionRule, EvolutionRules, GlobalRules,
    KillReward, PieceStats, PlayerManaRules, ShieldSystem,
};
pub use provider::ConfigProvider;
pub use version::{ConfigVersion, InMemoryVersionStore, VersionId, VersionStatus, VersionStore};
pub use versioning::ConfigVersioning;
