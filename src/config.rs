//! Store Configuration
//!
//! Everything here is fixed when a store is opened. Nothing can be changed
//! on a running store.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Maximum key length, in UTF-8 bytes.
pub const MAX_KEY_LENGTH: usize = 32;

/// Maximum size of a value, measured on its compact JSON encoding.
pub const MAX_VALUE_SIZE: usize = 16 * 1024;

/// Maximum number of entries accepted by a single batch create.
pub const BATCH_LIMIT: usize = 100;

/// Maximum size of the snapshot file (1 GiB).
pub const MAX_SNAPSHOT_SIZE: u64 = 1024 * 1024 * 1024;

/// Snapshot file used when no path is given.
pub const DEFAULT_SNAPSHOT_PATH: &str = "datastore.json";

/// Default interval between background expiry sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Size limits enforced on every insert and on the snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum key length in bytes
    pub max_key_length: usize,
    /// Maximum encoded value size in bytes
    pub max_value_size: usize,
    /// Maximum entries per batch create
    pub batch_limit: usize,
    /// Maximum snapshot file size in bytes
    pub max_snapshot_size: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_key_length: MAX_KEY_LENGTH,
            max_value_size: MAX_VALUE_SIZE,
            batch_limit: BATCH_LIMIT,
            max_snapshot_size: MAX_SNAPSHOT_SIZE,
        }
    }
}

/// Configuration for opening a [`Store`](crate::Store).
///
/// # Example
///
/// ```
/// use snapkv::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_path("sessions.json")
///     .with_sweep_interval(Duration::from_secs(30));
/// assert_eq!(config.path.to_str(), Some("sessions.json"));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Location of the snapshot file
    pub path: PathBuf,
    /// Interval between background sweeps (default: 10 minutes)
    pub sweep_interval: Duration,
    /// Size limits
    pub limits: Limits,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            limits: Limits::default(),
        }
    }
}

impl StoreConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the snapshot file location.
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    /// Sets how often the background task removes expired entries.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Replaces the size limits.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}
