//! Configuration version records and the store contract.
//!
//! A version moves through `Draft -> Active -> Published`:
//! - Drafts are the only editable versions.
//! - Publishing makes a version Active and demotes the previous Active
//!   version to Published in the same atomic step.
//! - Versions are never deleted; history is retained.
//!
//! The [`VersionStore`] trait is the persistence boundary. The relational
//! mapping lives outside this crate; [`InMemoryVersionStore`] backs tests
//! and single-process deployments.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Identifier of a configuration version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionId(pub u32);

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Lifecycle state of a version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VersionStatus {
    /// Editable work in progress.
    Draft,
    /// Previously published, retained as history.
    Published,
    /// The single version governing gameplay.
    Active,
}

/// A stored configuration version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigVersion {
    /// Version id.
    pub id: VersionId,
    /// Human-readable label.
    pub name: String,
    /// Lifecycle state.
    pub status: VersionStatus,
    /// JSON payload (see [`crate::config::BalanceConfig`]).
    pub payload: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time this version last became Active.
    pub published_at: Option<DateTime<Utc>>,
}

/// Persistence contract for configuration versions.
///
/// `update_payload` and `publish` must be atomic with respect to each
/// other: a payload edit can never land on a version that has just been
/// published.
pub trait VersionStore: Send + Sync {
    /// The Active version, if any.
    fn active(&self) -> Result<Option<ConfigVersion>>;

    /// A version by id.
    fn get(&self, id: VersionId) -> Result<Option<ConfigVersion>>;

    /// All versions, oldest first.
    fn list(&self) -> Result<Vec<ConfigVersion>>;

    /// Store a new Draft and return its id.
    fn insert_draft(&self, name: &str, payload: String) -> Result<VersionId>;

    /// Replace a Draft's payload. Fails with `ImmutableVersion` otherwise.
    fn update_payload(&self, id: VersionId, payload: String) -> Result<()>;

    /// Make `id` Active, demoting the current Active version to Published.
    ///
    /// Returns the id of the demoted version, if there was one.
    fn publish(&self, id: VersionId) -> Result<Option<VersionId>>;
}

#[derive(Debug, Default)]
struct StoreInner {
    versions: Vec<ConfigVersion>,
    next_id: u32,
}

impl StoreInner {
    fn find_mut(&mut self, id: VersionId) -> Result<&mut ConfigVersion> {
        self.versions
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(EngineError::VersionNotFound(id))
    }
}

/// Mutex-backed [`VersionStore`].
#[derive(Debug, Default)]
pub struct InMemoryVersionStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryVersionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl VersionStore for InMemoryVersionStore {
    fn active(&self) -> Result<Option<ConfigVersion>> {
        Ok(self
            .lock()
            .versions
            .iter()
            .find(|v| v.status == VersionStatus::Active)
            .cloned())
    }

    fn get(&self, id: VersionId) -> Result<Option<ConfigVersion>> {
        Ok(self.lock().versions.iter().find(|v| v.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<ConfigVersion>> {
        Ok(self.lock().versions.clone())
    }

    fn insert_draft(&self, name: &str, payload: String) -> Result<VersionId> {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = VersionId(inner.next_id);
        inner.versions.push(ConfigVersion {
            id,
            name: name.to_string(),
            status: VersionStatus::Draft,
            payload,
            created_at: Utc::now(),
            published_at: None,
        });
        Ok(id)
    }

    fn update_payload(&self, id: VersionId, payload: String) -> Result<()> {
        let mut inner = self.lock();
        let version = inner.find_mut(id)?;
        if version.status != VersionStatus::Draft {
            return Err(EngineError::ImmutableVersion {
                version: id,
                status: version.status,
            });
        }
        version.payload = payload;
        Ok(())
    }

    fn publish(&self, id: VersionId) -> Result<Option<VersionId>> {
        let mut inner = self.lock();

        // Validate before mutating anything
        inner.find_mut(id)?;

        let mut demoted = None;
        for version in inner.versions.iter_mut() {
            if version.status == VersionStatus::Active && version.id != id {
                version.status = VersionStatus::Published;
                demoted = Some(version.id);
            }
        }

        let target = inner.find_mut(id)?;
        if target.status != VersionStatus::Active {
            target.status = VersionStatus::Active;
            target.published_at = Some(Utc::now());
        }
        Ok(demoted)
    }
}
