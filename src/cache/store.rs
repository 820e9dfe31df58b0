//! Entry Store Module
//!
//! The fast in-process cache tier: a plain key/value map with lazy TTL
//! expiration. Pure and synchronous, no I/O; misses are ordinary `None`s,
//! never errors.

use std::collections::HashMap;

use crate::cache::{CacheEntry, EntrySnapshot};

// == Entry Store ==
/// In-process tier of the two-tier cache.
///
/// Expired entries are removed lazily, the moment a read observes them.
/// Nothing here depends on a background sweep running.
#[derive(Debug, Default)]
pub struct EntryStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
}

impl EntryStore {
    // == Constructor ==
    /// Creates an empty EntryStore.
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Returns the entry under `key` if present and not expired.
    ///
    /// An expired entry is removed as a side effect and reported as a miss,
    /// which is why reads take `&mut self`.
    pub fn get(&mut self, key: &str) -> Option<CacheEntry> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                None
            }
            Some(entry) => Some(entry.clone()),
            None => None,
        }
    }

    // == Insert ==
    /// Inserts or replaces the entry under `key`.
    ///
    /// Last write wins: a previous entry under the same key is dropped
    /// whole, never merged or extended.
    pub fn insert(&mut self, key: &str, entry: CacheEntry) {
        self.entries.insert(key.to_string(), entry);
    }

    // == Remove ==
    /// Removes the entry under `key`; no-op when absent.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Remove Where ==
    /// Removes every entry whose key satisfies `predicate`.
    ///
    /// Returns the removed keys.
    pub fn remove_where(&mut self, predicate: impl Fn(&str) -> bool) -> Vec<String> {
        let doomed: Vec<String> = self
            .entries
            .keys()
            .filter(|key| predicate(key))
            .cloned()
            .collect();

        for key in &doomed {
            self.entries.remove(key);
        }
        doomed
    }

    // == Clear ==
    /// Removes every entry. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    // == Prune Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the removed keys. Purely an eager form of the lazy removal
    /// that reads perform anyway.
    pub fn prune_expired(&mut self) -> Vec<String> {
        let doomed: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            self.entries.remove(key);
        }
        doomed
    }

    // == Snapshot ==
    /// Returns a diagnostic view of the live entries, sorted by key.
    ///
    /// Expired entries are semantically absent and are skipped (not
    /// removed; snapshots must not mutate observable state).
    pub fn snapshot(&self) -> Vec<EntrySnapshot> {
        let mut entries: Vec<EntrySnapshot> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, entry)| EntrySnapshot {
                key: key.clone(),
                ms_until_expiry: entry.ttl_remaining_ms(),
            })
            .collect();

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    fn entry(value: &str, ttl_ms: u64) -> CacheEntry {
        CacheEntry::new(json!(value), Duration::from_millis(ttl_ms))
    }

    #[test]
    fn test_store_new() {
        let store = EntryStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_insert_and_get() {
        let mut store = EntryStore::new();

        store.insert("key1", entry("value1", 60_000));
        let found = store.get("key1").unwrap();

        assert_eq!(found.data, json!("value1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = EntryStore::new();
        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_store_get_removes_expired() {
        let mut store = EntryStore::new();

        store.insert("key1", entry("value1", 30));
        sleep(Duration::from_millis(50));

        assert!(store.get("key1").is_none());
        // The expired entry was dropped, not just hidden
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_overwrite_replaces_whole_entry() {
        let mut store = EntryStore::new();

        store.insert("key1", entry("value1", 30));
        store.insert("key1", entry("value2", 60_000));
        sleep(Duration::from_millis(50));

        // The second insert's TTL governs; the first entry's is gone
        let found = store.get("key1").unwrap();
        assert_eq!(found.data, json!("value2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_remove() {
        let mut store = EntryStore::new();

        store.insert("key1", entry("value1", 60_000));
        assert!(store.remove("key1"));
        assert!(!store.remove("key1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_remove_where() {
        let mut store = EntryStore::new();

        store.insert("a:list:1", entry("l1", 60_000));
        store.insert("a:list:2", entry("l2", 60_000));
        store.insert("a:detail:9", entry("d9", 60_000));

        let mut removed = store.remove_where(|key| key.starts_with("a:list:"));
        removed.sort();

        assert_eq!(removed, vec!["a:list:1".to_string(), "a:list:2".to_string()]);
        assert!(store.get("a:list:1").is_none());
        assert!(store.get("a:detail:9").is_some());
    }

    #[test]
    fn test_store_clear() {
        let mut store = EntryStore::new();

        store.insert("key1", entry("value1", 60_000));
        store.insert("key2", entry("value2", 60_000));

        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_prune_expired() {
        let mut store = EntryStore::new();

        store.insert("short", entry("v", 30));
        store.insert("long", entry("v", 60_000));
        sleep(Duration::from_millis(50));

        let removed = store.prune_expired();
        assert_eq!(removed, vec!["short".to_string()]);
        assert_eq!(store.len(), 1);
        assert!(store.get("long").is_some());
    }

    #[test]
    fn test_store_snapshot_skips_expired() {
        let mut store = EntryStore::new();

        store.insert("beta", entry("v", 60_000));
        store.insert("alpha", entry("v", 60_000));
        store.insert("gone", entry("v", 30));
        sleep(Duration::from_millis(50));

        let snapshot = store.snapshot();
        let keys: Vec<&str> = snapshot.iter().map(|e| e.key.as_str()).collect();

        // Sorted by key, expired entry absent
        assert_eq!(keys, vec!["alpha", "beta"]);
        assert!(snapshot.iter().all(|e| e.ms_until_expiry > 0));
    }
}
