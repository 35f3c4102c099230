//! Background Expiry Sweeper
//!
//! Lazy expiry (checking on read) keeps reads correct, but a key that expires
//! and is never read again would stay in memory forever. The sweeper bounds
//! that growth by periodically running a full expiry pass over the store.
//!
//! ## Design
//!
//! The sweeper runs as a Tokio task and:
//! 1. Sleeps for a fixed interval (default: 10 minutes)
//! 2. Wakes up and runs [`StorageEngine::cleanup_expired`] on the blocking pool
//! 3. Logs how many entries were removed
//!
//! The pass takes the same lock as client operations for its whole duration
//! and persists the snapshot when it removed anything.

use crate::storage::StorageEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

/// A handle to the running expiry sweeper.
///
/// When this handle is dropped, the sweeper task will be stopped.
#[derive(Debug)]
pub struct ExpirySweeper {
    /// Sender to signal shutdown
    shutdown_tx: watch::Sender<bool>,
}

impl ExpirySweeper {
    /// Starts the expiry sweeper as a background task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use snapkv::storage::{ExpirySweeper, StorageEngine};
    /// use snapkv::Limits;
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), snapkv::StoreError> {
    /// let engine = Arc::new(StorageEngine::open("sessions.json", Limits::default())?);
    /// let sweeper = ExpirySweeper::start(engine, Duration::from_secs(60));
    ///
    /// // Sweeper runs in the background...
    ///
    /// // Dropping the sweeper will stop it
    /// drop(sweeper);
    /// # Ok(())
    /// # }
    /// ```
    pub fn start(engine: Arc<StorageEngine>, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(sweeper_loop(engine, interval, shutdown_rx));

        info!(interval_secs = interval.as_secs_f64(), "Background expiry sweeper started");

        Self { shutdown_tx }
    }

    /// Stops the expiry sweeper.
    ///
    /// A pass that is already running completes; no new pass starts.
    /// This is called automatically when the handle is dropped.
    pub fn stop(&self) {
        if self.shutdown_tx.send_replace(true) {
            return;
        }
        info!("Background expiry sweeper stopped");
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main sweeper loop.
async fn sweeper_loop(
    engine: Arc<StorageEngine>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Expiry sweeper received shutdown signal");
                    return;
                }
            }
        }

        let pass = Arc::clone(&engine);
        match tokio::task::spawn_blocking(move || pass.cleanup_expired()).await {
            Ok(Ok(0)) => trace!("Sweep found no expired keys"),
            Ok(Ok(expired)) => debug!(
                expired = expired,
                keys_remaining = engine.len(),
                "Expired keys cleaned up"
            ),
            // The removals stay in memory; the next successful persist catches up.
            Ok(Err(e)) => warn!(error = %e, "Sweep removed expired keys but could not persist"),
            Err(e) => warn!(error = %e, "Sweep pass aborted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;
    use crate::storage::Snapshot;
    use serde_json::json;
    use tempfile::TempDir;

    fn engine_in(dir: &TempDir) -> Arc<StorageEngine> {
        let path = dir.path().join("db.json");
        Arc::new(StorageEngine::open(path, Limits::default()).unwrap())
    }

    #[tokio::test]
    async fn test_sweeper_cleans_expired_keys() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);

        for i in 0..10 {
            engine.create(&format!("key{}", i), json!("value"), 1).unwrap();
        }
        engine.create("persistent", json!("value"), 0).unwrap();
        assert_eq!(engine.len(), 11);

        let _sweeper = ExpirySweeper::start(Arc::clone(&engine), Duration::from_millis(50));

        // TTLs have one-second granularity
        tokio::time::sleep(Duration::from_millis(2500)).await;

        // Only the persistent key should remain, without any read touching them
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.keys(), vec!["persistent".to_string()]);

        // The sweep persisted its removals
        let on_disk = Snapshot::new(dir.path().join("db.json"), u64::MAX)
            .load()
            .unwrap();
        assert_eq!(on_disk.len(), 1);
        assert!(on_disk.contains_key("persistent"));
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_drop() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);

        {
            let _sweeper = ExpirySweeper::start(Arc::clone(&engine), Duration::from_millis(10));
            tokio::time::sleep(Duration::from_millis(50)).await;
            // Sweeper is dropped here
        }

        engine.create("key", json!("value"), 1).unwrap();

        // Keys should NOT be cleaned up since the sweeper is stopped
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(engine.len(), 1);

        // but a read still applies lazy expiry
        assert!(matches!(
            engine.read("key"),
            Err(crate::StoreError::KeyExpired(_))
        ));
        assert_eq!(engine.len(), 0);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let sweeper = ExpirySweeper::start(engine_in(&dir), Duration::from_secs(600));
        sweeper.stop();
        sweeper.stop();
        drop(sweeper);
    }
}
