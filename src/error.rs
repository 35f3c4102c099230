//! Store Error Types
//!
//! Every expected failure of a store operation is one of these variants.
//! Validation errors (`KeyTooLong`, `ValueTooLarge`, `DuplicateKey`,
//! `BatchTooLarge`) are raised before anything is mutated.
//!
//! `PersistFailed` is different: the in-memory change has already been
//! applied when it is returned, so memory is ahead of disk until the next
//! successful persist.

use crate::storage::SnapshotError;
use thiserror::Error;

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key is longer than the configured maximum
    #[error("key length {len} exceeds {max} bytes")]
    KeyTooLong { len: usize, max: usize },

    /// Encoded value is larger than the configured maximum
    #[error("value size {size} exceeds {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    /// Key already exists in the store, or twice in one batch
    #[error("key already exists: {0}")]
    DuplicateKey(String),

    /// Key is not present
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Key was present but its TTL had elapsed; it has now been removed
    #[error("key has expired: {0}")]
    KeyExpired(String),

    /// Batch holds more entries than allowed
    #[error("batch of {len} entries exceeds limit of {max}")]
    BatchTooLarge { len: usize, max: usize },

    /// Snapshot could not be written; the in-memory change was kept
    #[error("failed to persist snapshot: {0}")]
    PersistFailed(#[source] SnapshotError),

    /// Snapshot could not be read when opening the store
    #[error("failed to load snapshot: {0}")]
    LoadFailed(#[source] SnapshotError),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Returns true if the error was raised before any mutation,
    /// leaving the store unchanged.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::KeyTooLong { .. }
                | Self::ValueTooLarge { .. }
                | Self::DuplicateKey(_)
                | Self::BatchTooLarge { .. }
        )
    }
}
