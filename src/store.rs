//! Store Lifecycle
//!
//! [`Store`] ties a [`StorageEngine`] to its background sweeper:
//!
//! ```text
//! open():  load snapshot ──> start sweeper ──> Ready
//! close(): stop sweeper ──> final persist ──> Closed
//! ```
//!
//! Dropping a store that was not closed runs the same shutdown and logs a
//! failed final persist instead of returning it.

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::storage::{ExpirySweeper, StorageEngine, StorageStats};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// An embedded key-value store backed by a snapshot file.
///
/// The store owns its snapshot file exclusively for as long as it is open.
/// Sharing one file between processes is not supported.
///
/// # Example
///
/// ```no_run
/// use snapkv::Store;
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), snapkv::StoreError> {
/// let store = Store::open_path("datastore.json")?;
///
/// store.create("key1", json!({"name": "Alice"}), 10)?;
/// println!("{}", store.read("key1")?);
///
/// store.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Store {
    engine: Arc<StorageEngine>,
    sweeper: ExpirySweeper,
    closed: bool,
}

impl Store {
    /// Opens a store, loading its snapshot and starting the sweeper.
    ///
    /// # Errors
    ///
    /// [`StoreError::LoadFailed`](crate::StoreError::LoadFailed) if the
    /// snapshot exists but cannot be read; the store does not start.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let engine = Arc::new(StorageEngine::open(&config.path, config.limits)?);
        let sweeper = ExpirySweeper::start(Arc::clone(&engine), config.sweep_interval);

        info!(
            path = %config.path.display(),
            keys = engine.len(),
            "Store opened"
        );

        Ok(Self {
            engine,
            sweeper,
            closed: false,
        })
    }

    /// Opens a store at `path` with default settings.
    pub fn open_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open(StoreConfig::default().with_path(path))
    }

    /// See [`StorageEngine::create`].
    pub fn create(&self, key: &str, value: Value, ttl_secs: u64) -> StoreResult<()> {
        self.engine.create(key, value, ttl_secs)
    }

    /// See [`StorageEngine::read`].
    pub fn read(&self, key: &str) -> StoreResult<Value> {
        self.engine.read(key)
    }

    /// See [`StorageEngine::remove`].
    pub fn remove(&self, key: &str) -> StoreResult<()> {
        self.engine.remove(key)
    }

    /// See [`StorageEngine::batch_create`].
    pub fn batch_create(&self, entries: Vec<(String, Value)>, ttl_secs: u64) -> StoreResult<()> {
        self.engine.batch_create(entries, ttl_secs)
    }

    /// Runs an expiry pass now instead of waiting for the sweeper.
    pub fn cleanup_expired(&self) -> StoreResult<u64> {
        self.engine.cleanup_expired()
    }

    /// Returns all keys that have not expired.
    pub fn keys(&self) -> Vec<String> {
        self.engine.keys()
    }

    /// Returns the number of stored entries, including unswept expired ones.
    pub fn len(&self) -> usize {
        self.engine.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    /// Returns engine statistics.
    pub fn stats(&self) -> StorageStats {
        self.engine.stats()
    }

    /// Returns the underlying engine.
    pub fn engine(&self) -> &Arc<StorageEngine> {
        &self.engine
    }

    /// Stops the sweeper and writes a final snapshot.
    pub fn close(mut self) -> StoreResult<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> StoreResult<()> {
        self.closed = true;
        self.sweeper.stop();
        self.engine.persist()?;
        info!(path = %self.engine.path().display(), "Store closed");
        Ok(())
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "Final snapshot failed while dropping store");
        }
    }
}
