//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A single cached payload with its TTL metadata.
///
/// Entries are immutable once created: an update replaces the whole entry
/// rather than extending the old one. The struct serializes as-is into the
/// durable tier, so field names are part of the on-disk format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored payload
    pub data: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// A zero TTL is a programmer error; release builds clamp it to one
    /// millisecond so `expires_at` always lies after `created_at`.
    ///
    /// # Arguments
    /// * `data` - The payload to store
    /// * `ttl` - How long the entry stays live
    pub fn new(data: Value, ttl: Duration) -> Self {
        debug_assert!(!ttl.is_zero(), "cache entries need a positive TTL");
        let now = current_timestamp_ms();
        let ttl_ms = (ttl.as_millis() as u64).max(1);

        Self {
            data,
            created_at: now,
            expires_at: now + ttl_ms,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is live through its expiration instant
    /// and expired strictly after it, i.e. expired iff the current time is
    /// greater than `expires_at`. An expired entry is semantically absent;
    /// every read path treats it as a miss and removes it.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() > self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, clamped to zero once expired.
    ///
    /// This feeds the stats/debug surfaces only; expiry decisions go
    /// through [`CacheEntry::is_expired`].
    pub fn ttl_remaining_ms(&self) -> u64 {
        let now = current_timestamp_ms();
        self.expires_at.saturating_sub(now)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(json!("test_value"), Duration::from_secs(60));

        assert_eq!(entry.data, json!("test_value"));
        assert_eq!(entry.expires_at, entry.created_at + 60_000);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(json!("test_value"), Duration::from_millis(40));

        assert!(!entry.is_expired());

        // Wait for expiration
        sleep(Duration::from_millis(60));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_is_strict() {
        // An entry expiring exactly now is still live; only strictly-later
        // instants count as expired.
        let now = current_timestamp_ms();
        let at_boundary = CacheEntry {
            data: json!("x"),
            created_at: now - 1_000,
            expires_at: now + 5, // a few ms of slack for the assertion itself
        };
        assert!(!at_boundary.is_expired());

        let just_past = CacheEntry {
            data: json!("x"),
            created_at: now - 1_000,
            expires_at: now - 1,
        };
        assert!(just_past.is_expired());
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = CacheEntry::new(json!("test_value"), Duration::from_secs(10));

        let remaining = entry.ttl_remaining_ms();
        assert!(remaining <= 10_000);
        assert!(remaining >= 9_000);
    }

    #[test]
    fn test_ttl_remaining_clamps_to_zero() {
        let now = current_timestamp_ms();
        let expired = CacheEntry {
            data: json!("x"),
            created_at: now - 2_000,
            expires_at: now - 1_000,
        };

        assert_eq!(expired.ttl_remaining_ms(), 0);
    }

    #[test]
    fn test_entry_survives_serialization() {
        let entry = CacheEntry::new(json!({"id": "call_1", "outcome": "callback"}), Duration::from_secs(60));

        let encoded = serde_json::to_string(&entry).unwrap();
        let decoded: CacheEntry = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.data, entry.data);
        assert_eq!(decoded.created_at, entry.created_at);
        assert_eq!(decoded.expires_at, entry.expires_at);
    }
}
