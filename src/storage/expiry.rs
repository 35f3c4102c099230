//! Expiry Policy
//!
//! One predicate decides whether an entry is expired. It is shared by the
//! two places that expire entries:
//! 1. **Lazy**: a read checks the entry it is about to return
//! 2. **Eager**: the background sweep checks every entry
//!
//! Times are whole seconds since the Unix epoch so that expiry survives a
//! restart through the snapshot file.

use crate::storage::ValueEntry;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current time in seconds since the Unix epoch.
///
/// A clock set before the epoch reads as 0.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Computes the absolute expiry for a TTL given in seconds.
///
/// A TTL of 0 means the entry never expires.
#[inline]
pub fn deadline(ttl_secs: u64, now: u64) -> Option<u64> {
    match ttl_secs {
        0 => None,
        ttl => Some(now.saturating_add(ttl)),
    }
}

/// Returns true if `entry` is expired at `now`.
///
/// An entry is still valid at the exact second it expires.
#[inline]
pub fn is_expired(entry: &ValueEntry, now: u64) -> bool {
    entry.expires_at().is_some_and(|exp| now > exp)
}
