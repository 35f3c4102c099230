//! Locked Storage Engine
//!
//! This module implements the map behind a [`Store`](crate::Store): key
//! validation, duplicate rejection, lazy expiry and synchronous snapshot
//! persistence.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      StorageEngine                       │
//! │  ┌────────────────────────────┐    ┌──────────────────┐  │
//! │  │   Mutex<HashMap<String,    │───>│     Snapshot     │  │
//! │  │             ValueEntry>>   │    │   (JSON file)    │  │
//! │  └────────────────────────────┘    └──────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//!        ▲              ▲                     ▲
//!   create/read    remove/batch         ExpirySweeper
//! ```
//!
//! One exclusive lock covers both the map and the snapshot file. Every
//! operation holds it from validation through the snapshot write, so
//! mutations never interleave and a reader never sees half of a batch.
//!
//! ## Known Limits
//!
//! - Every successful mutation rewrites the whole snapshot, so write cost
//!   grows with the number of stored keys.
//! - A slow disk blocks every other operation for the duration of the write.
//! - A persist failure does not roll back the in-memory change.

use crate::config::Limits;
use crate::error::{StoreError, StoreResult};
use crate::storage::expiry::{self, unix_now};
use crate::storage::{Snapshot, ValueEntry};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// The map plus everything needed to keep it consistent with disk.
///
/// # Thread Safety
///
/// This struct is designed to be wrapped in an `Arc` and shared between
/// callers and the [`ExpirySweeper`](crate::storage::ExpirySweeper).
///
/// # Example
///
/// ```no_run
/// use snapkv::storage::StorageEngine;
/// use snapkv::Limits;
/// use serde_json::json;
///
/// let engine = StorageEngine::open("users.json", Limits::default())?;
///
/// engine.create("user:1", json!({"name": "Alice"}), 0)?;
/// assert_eq!(engine.read("user:1")?, json!({"name": "Alice"}));
///
/// // Expires one hour from now
/// engine.create("session:1", json!("token123"), 3600)?;
/// # Ok::<(), snapkv::StoreError>(())
/// ```
pub struct StorageEngine {
    /// Stored entries, also guarding the snapshot file
    data: Mutex<HashMap<String, ValueEntry>>,

    /// Where the map is persisted
    snapshot: Snapshot,

    /// Size limits checked on insert
    limits: Limits,

    /// Statistics: successful creates (batch entries counted individually)
    create_count: AtomicU64,

    /// Statistics: total read operations
    read_count: AtomicU64,

    /// Statistics: successful removes
    remove_count: AtomicU64,

    /// Statistics: entries removed because they expired
    expired_count: AtomicU64,

    /// Statistics: successful snapshot writes
    persist_count: AtomicU64,

    /// Statistics: failed snapshot writes
    persist_failures: AtomicU64,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("path", &self.snapshot.path())
            .field("keys", &self.len())
            .field("persists", &self.persist_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl StorageEngine {
    /// Opens the engine, loading the snapshot at `path` if one exists.
    ///
    /// A missing snapshot is created as an empty one. A snapshot that cannot
    /// be read or parsed fails with [`StoreError::LoadFailed`] and is left
    /// untouched; the engine refuses to start empty over it.
    ///
    /// Entries that expired while the store was closed are loaded as-is and
    /// expire lazily or on the next sweep.
    pub fn open(path: impl AsRef<Path>, limits: Limits) -> StoreResult<Self> {
        let snapshot = Snapshot::new(path.as_ref(), limits.max_snapshot_size);
        let existed = snapshot.exists();
        let entries = snapshot.load().map_err(StoreError::LoadFailed)?;

        let engine = Self::with_entries(snapshot, limits, entries);
        if !existed {
            engine.persist()?;
        }
        Ok(engine)
    }

    fn with_entries(
        snapshot: Snapshot,
        limits: Limits,
        entries: HashMap<String, ValueEntry>,
    ) -> Self {
        Self {
            data: Mutex::new(entries),
            snapshot,
            limits,
            create_count: AtomicU64::new(0),
            read_count: AtomicU64::new(0),
            remove_count: AtomicU64::new(0),
            expired_count: AtomicU64::new(0),
            persist_count: AtomicU64::new(0),
            persist_failures: AtomicU64::new(0),
        }
    }

    /// Returns the snapshot file location.
    pub fn path(&self) -> &Path {
        self.snapshot.path()
    }

    /// Returns the limits this engine was opened with.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Acquires the store lock.
    ///
    /// Every critical section leaves the map consistent, so a panic in
    /// another holder does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, ValueEntry>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes `data` to the snapshot. The caller must hold the lock.
    fn persist_locked(&self, data: &HashMap<String, ValueEntry>) -> StoreResult<()> {
        match self.snapshot.save(data) {
            Ok(_) => {
                self.persist_count.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.persist_failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "Snapshot persist failed, memory is ahead of disk");
                Err(StoreError::PersistFailed(e))
            }
        }
    }

    fn check_key(&self, key: &str) -> StoreResult<()> {
        if key.len() > self.limits.max_key_length {
            return Err(StoreError::KeyTooLong {
                len: key.len(),
                max: self.limits.max_key_length,
            });
        }
        Ok(())
    }

    fn check_value(&self, value: &Value) -> StoreResult<()> {
        let size = encoded_len(value);
        if size > self.limits.max_value_size {
            return Err(StoreError::ValueTooLarge {
                size,
                max: self.limits.max_value_size,
            });
        }
        Ok(())
    }

    /// Creates a key that does not exist yet.
    ///
    /// A `ttl_secs` of 0 means the entry never expires. Returns only after
    /// the new entry has been written to the snapshot.
    ///
    /// # Errors
    ///
    /// Checked in order: [`StoreError::KeyTooLong`],
    /// [`StoreError::ValueTooLarge`], [`StoreError::DuplicateKey`]. Existing
    /// keys are never overwritten, even if they have expired but not yet
    /// been removed.
    pub fn create(&self, key: &str, value: Value, ttl_secs: u64) -> StoreResult<()> {
        self.check_key(key)?;
        self.check_value(&value)?;

        let mut data = self.lock();
        if data.contains_key(key) {
            return Err(StoreError::DuplicateKey(key.to_string()));
        }

        let expires_at = expiry::deadline(ttl_secs, unix_now());
        data.insert(key.to_string(), ValueEntry::new(value, expires_at));
        self.create_count.fetch_add(1, Ordering::Relaxed);
        debug!(key, ttl_secs, "Key created");

        self.persist_locked(&data)
    }

    /// Reads the value stored under `key`.
    ///
    /// This implements "lazy expiry": an expired entry is removed and
    /// persisted, and the call fails with [`StoreError::KeyExpired`].
    /// Reading never extends an entry's TTL.
    pub fn read(&self, key: &str) -> StoreResult<Value> {
        self.read_count.fetch_add(1, Ordering::Relaxed);

        let mut data = self.lock();
        let entry = data
            .get(key)
            .ok_or_else(|| StoreError::KeyNotFound(key.to_string()))?;

        if !entry.is_expired_at(unix_now()) {
            return Ok(entry.value().clone());
        }

        data.remove(key);
        self.expired_count.fetch_add(1, Ordering::Relaxed);
        debug!(key, "Key expired on read");

        self.persist_locked(&data)?;
        Err(StoreError::KeyExpired(key.to_string()))
    }

    /// Removes `key`.
    ///
    /// An entry that has expired but not yet been swept is removed like any
    /// other; only a key absent from the map reports
    /// [`StoreError::KeyNotFound`].
    pub fn remove(&self, key: &str) -> StoreResult<()> {
        let mut data = self.lock();
        if data.remove(key).is_none() {
            return Err(StoreError::KeyNotFound(key.to_string()));
        }

        self.remove_count.fetch_add(1, Ordering::Relaxed);
        debug!(key, "Key removed");

        self.persist_locked(&data)
    }

    /// Creates several keys as one all-or-nothing unit.
    ///
    /// The whole batch is validated before anything is inserted: its size,
    /// then every entry's key and value size, then duplicates against the
    /// store and within the batch itself. All entries share one expiry time,
    /// and one snapshot write covers the batch.
    ///
    /// An empty batch succeeds without touching the snapshot.
    pub fn batch_create(&self, entries: Vec<(String, Value)>, ttl_secs: u64) -> StoreResult<()> {
        if entries.len() > self.limits.batch_limit {
            return Err(StoreError::BatchTooLarge {
                len: entries.len(),
                max: self.limits.batch_limit,
            });
        }
        for (key, value) in &entries {
            self.check_key(key)?;
            self.check_value(value)?;
        }
        if entries.is_empty() {
            return Ok(());
        }

        let mut data = self.lock();
        let mut seen = HashSet::with_capacity(entries.len());
        for (key, _) in &entries {
            if data.contains_key(key) || !seen.insert(key.as_str()) {
                return Err(StoreError::DuplicateKey(key.clone()));
            }
        }

        let count = entries.len();
        let expires_at = expiry::deadline(ttl_secs, unix_now());
        for (key, value) in entries {
            data.insert(key, ValueEntry::new(value, expires_at));
        }
        self.create_count.fetch_add(count as u64, Ordering::Relaxed);
        debug!(entries = count, ttl_secs, "Batch created");

        self.persist_locked(&data)
    }

    /// Removes every expired entry in one pass under the store lock.
    ///
    /// This is called by the background expiry sweeper. The snapshot is
    /// written only if something was removed.
    ///
    /// # Returns
    ///
    /// Returns the number of entries that were removed.
    pub fn cleanup_expired(&self) -> StoreResult<u64> {
        let mut data = self.lock();
        let now = unix_now();
        let before = data.len();

        data.retain(|_, entry| !expiry::is_expired(entry, now));

        let removed = (before - data.len()) as u64;
        if removed > 0 {
            self.expired_count.fetch_add(removed, Ordering::Relaxed);
            self.persist_locked(&data)?;
        }

        Ok(removed)
    }

    /// Writes the full map to the snapshot.
    pub fn persist(&self) -> StoreResult<()> {
        let data = self.lock();
        self.persist_locked(&data)
    }

    /// Returns the number of entries in the map, including expired entries
    /// that have not been removed yet.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns all keys that have not expired, in no particular order.
    ///
    /// Unlike [`read`](Self::read), this does not remove expired entries.
    pub fn keys(&self) -> Vec<String> {
        let now = unix_now();
        self.lock()
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Returns engine statistics.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.len() as u64,
            creates: self.create_count.load(Ordering::Relaxed),
            reads: self.read_count.load(Ordering::Relaxed),
            removes: self.remove_count.load(Ordering::Relaxed),
            expired: self.expired_count.load(Ordering::Relaxed),
            persists: self.persist_count.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
        }
    }
}

/// Size of a value's compact JSON encoding.
fn encoded_len(value: &Value) -> usize {
    value.to_string().len()
}

/// Engine statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub keys: u64,
    pub creates: u64,
    pub reads: u64,
    pub removes: u64,
    pub expired: u64,
    pub persists: u64,
    pub persist_failures: u64,
}
