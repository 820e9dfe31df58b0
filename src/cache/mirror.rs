//! Durable Mirror Module
//!
//! Best-effort persistence of cache entries into the durable file store,
//! so the cache rehydrates instantly after a restart. Every failure mode
//! here is swallowed and logged: a broken mirror degrades the cache to
//! memory-only, it never becomes a caller-visible error.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{CacheEntry, STORAGE_PREFIX};
use crate::storage::FileStore;

// == Disk Mirror ==
/// The durable tier of the two-tier cache.
///
/// Entries are stored as JSON under the reserved [`STORAGE_PREFIX`], so the
/// medium can hold unrelated application items without the cache ever
/// touching them.
#[derive(Debug, Clone)]
pub struct DiskMirror {
    store: Arc<FileStore>,
}

impl DiskMirror {
    // == Constructor ==
    /// Creates a mirror over the given storage medium.
    pub fn new(store: Arc<FileStore>) -> Self {
        Self { store }
    }

    fn storage_key(key: &str) -> String {
        format!("{}{}", STORAGE_PREFIX, key)
    }

    // == Write ==
    /// Persists `entry` under `key`, best-effort.
    ///
    /// Encoding or storage failures are logged and swallowed; the entry
    /// simply stays memory-only.
    pub fn write(&self, key: &str, entry: &CacheEntry) {
        let encoded = match serde_json::to_string(entry) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!("cache entry {} not encodable, keeping it memory-only: {}", key, err);
                return;
            }
        };

        if let Err(err) = self.store.set_item(&Self::storage_key(key), &encoded) {
            warn!("cache entry {} not persisted, keeping it memory-only: {}", key, err);
        }
    }

    // == Read ==
    /// Returns the persisted entry under `key` if present, well-formed,
    /// and not expired.
    ///
    /// Malformed and expired entries are discarded on sight and reported
    /// as absent.
    pub fn read(&self, key: &str) -> Option<CacheEntry> {
        let raw = self.store.get_item(&Self::storage_key(key))?;

        let entry = match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                warn!("discarding malformed durable cache entry {}: {}", key, err);
                self.remove(key);
                return None;
            }
        };

        if entry.is_expired() {
            debug!("discarding expired durable cache entry {}", key);
            self.remove(key);
            return None;
        }

        Some(entry)
    }

    // == Remove ==
    /// Removes the persisted entry under `key`, best-effort.
    pub fn remove(&self, key: &str) {
        if let Err(err) = self.store.remove_item(&Self::storage_key(key)) {
            warn!("durable cache entry {} not removed: {}", key, err);
        }
    }

    // == Remove Where ==
    /// Removes every persisted cache entry whose logical key satisfies
    /// `predicate`. Items outside the reserved prefix are never touched.
    ///
    /// Returns the removed logical keys.
    pub fn remove_where(&self, predicate: impl Fn(&str) -> bool) -> Vec<String> {
        let removed = self.store.remove_items_where(|stored| {
            stored
                .strip_prefix(STORAGE_PREFIX)
                .map_or(false, &predicate)
        });

        match removed {
            Ok(keys) => keys
                .iter()
                .filter_map(|stored| stored.strip_prefix(STORAGE_PREFIX))
                .map(str::to_string)
                .collect(),
            Err(err) => {
                warn!("durable cache invalidation failed: {}", err);
                Vec::new()
            }
        }
    }

    // == Clear ==
    /// Removes every persisted cache entry. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        self.remove_where(|_| true).len()
    }

    // == Prune Expired ==
    /// Removes every expired (or unreadable) persisted entry.
    ///
    /// Returns the removed logical keys.
    pub fn prune_expired(&self) -> Vec<String> {
        let doomed: Vec<String> = self
            .store
            .keys()
            .into_iter()
            .filter_map(|stored| {
                let logical = stored.strip_prefix(STORAGE_PREFIX)?;
                let raw = self.store.get_item(&stored)?;
                match serde_json::from_str::<CacheEntry>(&raw) {
                    Ok(entry) if entry.is_expired() => Some(logical.to_string()),
                    Ok(_) => None,
                    Err(_) => Some(logical.to_string()),
                }
            })
            .collect();

        if doomed.is_empty() {
            return Vec::new();
        }
        self.remove_where(|key| doomed.iter().any(|d| d == key))
    }
}
