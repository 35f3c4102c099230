//! Stored Entries
//!
//! A [`ValueEntry`] is what the map holds for each key: the value itself
//! and the absolute time (seconds since the Unix epoch) at which it stops
//! being readable.
//!
//! The serde representation is the snapshot record format:
//!
//! ```text
//! {"value": <any JSON>, "ttl": <expiry in epoch seconds, 0 = never>}
//! ```

use crate::storage::expiry;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored value with its optional expiry time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueEntry {
    /// The stored value
    value: Value,
    /// When this entry expires (None = never expires)
    #[serde(rename = "ttl", with = "epoch_or_never")]
    expires_at: Option<u64>,
}

impl ValueEntry {
    /// Creates an entry that expires at `expires_at` (epoch seconds).
    pub fn new(value: Value, expires_at: Option<u64>) -> Self {
        Self { value, expires_at }
    }

    /// Creates an entry that never expires.
    pub fn persistent(value: Value) -> Self {
        Self::new(value, None)
    }

    /// Returns the stored value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the expiry time in epoch seconds, or None if it never expires.
    pub fn expires_at(&self) -> Option<u64> {
        self.expires_at
    }

    /// Checks if this entry has expired at `now`.
    #[inline]
    pub fn is_expired_at(&self, now: u64) -> bool {
        expiry::is_expired(self, now)
    }
}

/// Snapshot files encode "never expires" as `0`.
mod epoch_or_never {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(expires_at: &Option<u64>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(expires_at.unwrap_or(0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok((secs != 0).then_some(secs))
    }
}
