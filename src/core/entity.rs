//! Piece identification.
//!
//! Every piece instance has a unique `PieceId`, issued by a
//! [`PieceIdGenerator`]. A single generator is shared by every session in a
//! process, so ids are never reused for the lifetime of the process.
//!
//! ## Usage
//!
//! ```
//! use tactics_engine::core::PieceIdGenerator;
//!
//! let ids = PieceIdGenerator::new();
//! let a = ids.next_id().unwrap();
//! let b = ids.next_id().unwrap();
//!
//! assert!(b > a);
//! assert_eq!(ids.issued(), 2);
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Unique identifier for a piece instance.
///
/// Ids are ordered by issue time: a later id always compares greater.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceId(pub u32);

impl PieceId {
    /// Create a piece ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for PieceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PieceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Piece({})", self.0)
    }
}

/// Process-wide source of piece ids.
///
/// Safe to share between threads (wrap in `Arc`). Ids are strictly
/// increasing across all callers and start at 1; `PieceId(0)` is never issued.
/// `u32::MAX` marks exhaustion and is never issued either.
#[derive(Debug)]
pub struct PieceIdGenerator {
    next: AtomicU32,
}

impl PieceIdGenerator {
    /// Create a generator whose first id is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU32::new(1),
        }
    }

    /// Create a generator that resumes after `last_issued`.
    ///
    /// Used when a process restores sessions whose pieces already hold ids.
    #[must_use]
    pub const fn starting_after(last_issued: u32) -> Self {
        Self {
            next: AtomicU32::new(last_issued.saturating_add(1)),
        }
    }

    /// Issue the next id.
    ///
    /// Fails with `InvariantViolation` once the id space is exhausted; the
    /// counter never wraps.
    pub fn next_id(&self) -> Result<PieceId> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .map(PieceId)
            .map_err(|_| EngineError::InvariantViolation("piece id space exhausted".into()))
    }

    /// Number of ids issued so far.
    #[must_use]
    pub fn issued(&self) -> u32 {
        self.next.load(Ordering::Relaxed) - 1
    }

    /// The id the next call to `next_id` will return.
    #[must_use]
    pub fn peek(&self) -> PieceId {
        PieceId(self.next.load(Ordering::Relaxed))
    }
}

impl Default for PieceIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
