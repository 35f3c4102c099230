//! Snapshot Persistence
//!
//! The whole map is written to one JSON file on every persist. The file is a
//! point-in-time mirror, not a log:
//!
//! ```text
//! {"key1": {"value": {"name": "Alice"}, "ttl": 1732000000},
//!  "key2": {"value": {"name": "Bob"}, "ttl": 0}}
//! ```
//!
//! An empty store is written as `{}`.
//!
//! ## Write Protocol
//!
//! 1. Encode the full map in memory and check it against the size limit
//! 2. Write it to `<path>.tmp` and fsync
//! 3. Rename the temporary file over `<path>`
//!
//! A failed write leaves the previous snapshot in place.
//!
//! Only one store may own a snapshot file at a time. Nothing prevents two
//! processes from opening the same path; doing so is unsupported.

use crate::storage::ValueEntry;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while reading or writing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The file could not be opened, read, written or renamed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but is not a valid snapshot
    #[error("malformed snapshot {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The map could not be encoded
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    /// The snapshot is larger than allowed
    #[error("snapshot {} is {size} bytes (max: {max})", .path.display())]
    TooLarge { path: PathBuf, size: u64, max: u64 },
}

/// Reads and writes the snapshot file for one store.
#[derive(Debug, Clone)]
pub struct Snapshot {
    path: PathBuf,
    max_size: u64,
}

impl Snapshot {
    /// Creates a gateway for the file at `path`.
    pub fn new(path: impl Into<PathBuf>, max_size: u64) -> Self {
        Self {
            path: path.into(),
            max_size,
        }
    }

    /// Returns the snapshot file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the snapshot file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes the full map, replacing any previous contents.
    ///
    /// Returns the number of bytes written.
    pub fn save(&self, entries: &HashMap<String, ValueEntry>) -> Result<u64, SnapshotError> {
        let encoded = serde_json::to_vec(entries).map_err(SnapshotError::Encode)?;
        let size = encoded.len() as u64;
        if size > self.max_size {
            return Err(SnapshotError::TooLarge {
                path: self.path.clone(),
                size,
                max: self.max_size,
            });
        }

        let tmp = self.tmp_path();
        self.write_synced(&tmp, &encoded)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|source| {
                let _ = fs::remove_file(&tmp);
                self.io_error(source)
            })?;

        debug!(entries = entries.len(), bytes = size, "Snapshot written");
        Ok(size)
    }

    /// Reads the full map.
    ///
    /// A missing file is an empty store. A file that is unreadable, too large
    /// or not a snapshot is an error, and is left untouched.
    pub fn load(&self) -> Result<HashMap<String, ValueEntry>, SnapshotError> {
        let size = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if size > self.max_size {
            return Err(SnapshotError::TooLarge {
                path: self.path.clone(),
                size,
                max: self.max_size,
            });
        }

        let raw = fs::read(&self.path).map_err(|e| self.io_error(e))?;
        let entries: HashMap<String, ValueEntry> =
            serde_json::from_slice(&raw).map_err(|source| SnapshotError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        info!(
            path = %self.path.display(),
            entries = entries.len(),
            "Snapshot loaded"
        );
        Ok(entries)
    }

    fn write_synced(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn io_error(&self, source: io::Error) -> SnapshotError {
        SnapshotError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
