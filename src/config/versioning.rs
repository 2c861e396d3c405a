//! Configuration versioning workflow.
//!
//! Ties a [`VersionStore`] to the [`ConfigProvider`] that caches its Active
//! payload, so a successful publish always invalidates the cache.

use std::sync::Arc;

use tracing::{debug, info};

use super::balance::BalanceConfig;
use super::provider::ConfigProvider;
use super::version::{ConfigVersion, VersionId, VersionStore};
use crate::error::{EngineError, Result};

/// Draft / edit / publish operations over configuration versions.
pub struct ConfigVersioning {
    store: Arc<dyn VersionStore>,
    provider: Arc<ConfigProvider>,
}

impl ConfigVersioning {
    /// Create the workflow over a store and the provider that caches it.
    pub fn new(store: Arc<dyn VersionStore>, provider: Arc<ConfigProvider>) -> Self {
        Self { store, provider }
    }

    /// Create a new Draft.
    ///
    /// With `copy_from`, the draft starts with that version's payload;
    /// otherwise it starts empty (`{}`), which parses to all defaults.
    pub fn create_draft(&self, name: &str, copy_from: Option<VersionId>) -> Result<VersionId> {
        let payload = match copy_from {
            Some(source) => self.require(source)?.payload,
            None => "{}".to_string(),
        };
        let id = self.store.insert_draft(name, payload)?;
        debug!(version = %id, ?copy_from, "Created draft configuration");
        Ok(id)
    }

    /// Replace a Draft's payload.
    ///
    /// The payload must parse as a [`BalanceConfig`]; non-Draft targets fail
    /// with `ImmutableVersion`.
    pub fn edit_draft(&self, id: VersionId, payload: &str) -> Result<()> {
        let version = self.require(id)?;
        if version.status != super::VersionStatus::Draft {
            return Err(EngineError::ImmutableVersion {
                version: id,
                status: version.status,
            });
        }
        BalanceConfig::from_json(payload)?;
        self.store.update_payload(id, payload.to_string())?;
        debug!(version = %id, bytes = payload.len(), "Edited draft configuration");
        Ok(())
    }

    /// Make a version Active, demoting the previous Active version.
    ///
    /// The payload is validated first; on success the provider cache is
    /// invalidated so subsequent reads observe the new configuration.
    pub fn publish(&self, id: VersionId) -> Result<()> {
        let version = self.require(id)?;
        BalanceConfig::from_json(&version.payload)?;

        let demoted = self.store.publish(id)?;
        self.provider.invalidate();
        info!(version = %id, demoted = ?demoted, "Published balance configuration");
        Ok(())
    }

    /// All versions, oldest first.
    pub fn versions(&self) -> Result<Vec<ConfigVersion>> {
        self.store.list()
    }

    /// The Active version record, if any.
    pub fn active_version(&self) -> Result<Option<ConfigVersion>> {
        self.store.active()
    }

    fn require(&self, id: VersionId) -> Result<ConfigVersion> {
        self.store.get(id)?.ok_or(EngineError::VersionNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InMemoryVersionStore, VersionStatus};

    fn setup() -> (ConfigVersioning, Arc<ConfigProvider>) {
        let store: Arc<dyn VersionStore> = Arc::new(InMemoryVersionStore::new());
        let provider = Arc::new(ConfigProvider::new(Arc::clone(&store)));
        (ConfigVersioning::new(store, Arc::clone(&provider)), provider)
    }

    #[test]
    fn test_draft_copy() {
        let (versions, _) = setup();
        let a = versions.create_draft("a", None).unwrap();
        versions.edit_draft(a, r#"{"pieces":{"Pawn":{"hp":3}}}"#).unwrap();

        let b = versions.create_draft("b", Some(a)).unwrap();
        let copied = versions.versions().unwrap().into_iter().find(|v| v.id == b).unwrap();
        assert!(copied.payload.contains("Pawn"));
        assert_eq!(copied.status, VersionStatus::Draft);
    }

    #[test]
    fn test_edit_rejects_bad_payload() {
        let (versions, _) = setup();
        let a = versions.create_draft("a", None).unwrap();
        assert!(matches!(
            versions.edit_draft(a, "{ nope"),
            Err(EngineError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_publish_invalidates_provider() {
        let (versions, provider) = setup();
        let a = versions.create_draft("a", None).unwrap();
        versions.edit_draft(a, r#"{"pieces":{"Pawn":{"hp":3}}}"#).unwrap();
        versions.publish(a).unwrap();

        assert_eq!(provider.get_active().unwrap().piece_stats("Pawn").unwrap().hp, 3);
        assert!(provider.is_cached());

        let b = versions.create_draft("b", Some(a)).unwrap();
        versions.edit_draft(b, r#"{"pieces":{"Pawn":{"hp":4}}}"#).unwrap();
        versions.publish(b).unwrap();

        assert!(!provider.is_cached());
        assert_eq!(provider.get_active().unwrap().piece_stats("Pawn").unwrap().hp, 4);
    }

    #[test]
    fn test_edit_after_publish_is_immutable() {
        let (versions, _) = setup();
        let a = versions.create_draft("a", None).unwrap();
        versions.publish(a).unwrap();

        assert!(matches!(
            versions.edit_draft(a, "{}"),
            Err(EngineError::ImmutableVersion { status: VersionStatus::Active, .. })
        ));
    }
}
