//! Active-configuration provider with an explicit cache.
//!
//! The provider is an ordinary object passed to whoever needs it; there is
//! no process-global instance. Sessions receive the resolved
//! `Arc<BalanceConfig>` at construction and never resolve it themselves.
//!
//! ## Cache policy
//!
//! - Hits take a read lock only.
//! - A miss fetches and parses the Active payload with no lock held.
//!   Concurrent misses may each fetch; the first to finish fills the cache.
//! - Every invalidation bumps a generation counter. A fetch that started
//!   before an invalidation is returned to its caller but never cached, so
//!   a stale payload cannot survive a publish.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use super::balance::BalanceConfig;
use super::version::VersionStore;
use crate::error::{EngineError, Result};

#[derive(Debug, Default)]
struct CacheState {
    snapshot: Option<Arc<BalanceConfig>>,
    generation: u64,
}

/// Resolves and caches the Active [`BalanceConfig`].
pub struct ConfigProvider {
    store: Arc<dyn VersionStore>,
    cache: RwLock<CacheState>,
}

impl ConfigProvider {
    /// Create a provider over a version store.
    pub fn new(store: Arc<dyn VersionStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(CacheState::default()),
        }
    }

    /// The current Active configuration.
    ///
    /// Fails with `ConfigurationMissing` if no version is Active, and with
    /// `InvalidPayload` if the Active payload does not parse.
    pub fn get_active(&self) -> Result<Arc<BalanceConfig>> {
        let generation = {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(snapshot) = &cache.snapshot {
                return Ok(Arc::clone(snapshot));
            }
            cache.generation
        };

        let version = self.store.active()?.ok_or(EngineError::ConfigurationMissing)?;
        let config = Arc::new(BalanceConfig::from_json(&version.payload)?);
        debug!(version = %version.id, generation, "Resolved active balance configuration");

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if cache.generation == generation {
            match &cache.snapshot {
                Some(existing) => return Ok(Arc::clone(existing)),
                None => cache.snapshot = Some(Arc::clone(&config)),
            }
        }
        Ok(config)
    }

    /// Drop the cached snapshot; the next `get_active` re-resolves.
    pub fn invalidate(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.snapshot = None;
        cache.generation += 1;
        info!(generation = cache.generation, "Invalidated balance configuration cache");
    }

    /// Check if a snapshot is currently cached.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .is_some()
    }
}

impl std::fmt::Debug for ConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigProvider")
            .field("cached", &self.is_cached())
            .finish_non_exhaustive()
    }
}
