//! Cache Debug Module
//!
//! Read-only inspection of the durable cache tier, for operators poking at
//! a session's cache file. Observability only; nothing in the data layer
//! depends on it.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::cache::{CacheEntry, STORAGE_PREFIX};
use crate::storage::FileStore;

// == Cache Metrics ==
/// Aggregate view of the durable cache tier.
#[derive(Debug, Clone, Serialize)]
pub struct CacheMetrics {
    /// Entry counts keyed by resource family (the first key segment)
    pub entries_by_family: BTreeMap<String, usize>,
    /// Approximate storage footprint of the cache's items, in bytes
    pub estimated_bytes: usize,
    /// Entries past their TTL or no longer readable
    pub expired_entries: usize,
}

// == Cache Debug ==
/// Diagnostic surface over the durable storage medium.
///
/// Only items under the cache's reserved prefix are visible or touchable
/// from here; the rest of the medium stays private to the application.
#[derive(Debug)]
pub struct CacheDebug {
    store: Arc<FileStore>,
}

impl CacheDebug {
    // == Constructor ==
    /// Creates a debug view over the given storage medium.
    pub fn new(store: Arc<FileStore>) -> Self {
        Self { store }
    }

    // == Metrics ==
    /// Computes per-family entry counts, the estimated byte footprint,
    /// and how many entries are already dead.
    pub fn metrics(&self) -> CacheMetrics {
        let mut entries_by_family: BTreeMap<String, usize> = BTreeMap::new();
        let mut estimated_bytes = 0;
        let mut expired_entries = 0;

        for (stored_key, logical_key, raw) in self.cache_items() {
            estimated_bytes += stored_key.len() + raw.len();
            *entries_by_family
                .entry(family_of(&logical_key).to_string())
                .or_insert(0) += 1;

            match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(entry) if entry.is_expired() => expired_entries += 1,
                Ok(_) => {}
                Err(_) => expired_entries += 1,
            }
        }

        CacheMetrics {
            entries_by_family,
            estimated_bytes,
            expired_entries,
        }
    }

    // == Report ==
    /// Renders a human-readable dump of the cached entries, grouped by
    /// resource family.
    pub fn report(&self) -> String {
        let mut by_family: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (_, logical_key, raw) in self.cache_items() {
            let line = match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(entry) if entry.is_expired() => format!("{}  (expired)", logical_key),
                Ok(entry) => format!(
                    "{}  ({}s left, {} bytes)",
                    logical_key,
                    entry.ttl_remaining_ms() / 1000,
                    raw.len()
                ),
                Err(_) => format!("{}  (unreadable)", logical_key),
            };
            by_family
                .entry(family_of(&logical_key).to_string())
                .or_default()
                .push(line);
        }

        if by_family.is_empty() {
            return "durable cache is empty\n".to_string();
        }

        let metrics = self.metrics();
        let mut out = String::new();
        let total: usize = metrics.entries_by_family.values().sum();
        let _ = writeln!(
            out,
            "durable cache: {} entries ({} expired), ~{} bytes",
            total, metrics.expired_entries, metrics.estimated_bytes
        );
        for (family, mut lines) in by_family {
            let _ = writeln!(out, "[{}]", family);
            lines.sort();
            for line in lines {
                let _ = writeln!(out, "  {}", line);
            }
        }
        out
    }

    // == Print ==
    /// Writes the report to stdout.
    pub fn print(&self) {
        print!("{}", self.report());
    }

    // == Clear ==
    /// Removes every item under the cache's reserved prefix.
    ///
    /// Returns how many were dropped. Unrelated durable items survive.
    pub fn clear(&self) -> usize {
        match self
            .store
            .remove_items_where(|key| key.starts_with(STORAGE_PREFIX))
        {
            Ok(removed) => removed.len(),
            Err(err) => {
                warn!("durable cache clear failed: {}", err);
                0
            }
        }
    }

    // == Internals ==
    /// Yields (stored key, logical key, raw value) for every cache item.
    fn cache_items(&self) -> Vec<(String, String, String)> {
        self.store
            .keys()
            .into_iter()
            .filter_map(|stored_key| {
                let logical = stored_key.strip_prefix(STORAGE_PREFIX)?.to_string();
                let raw = self.store.get_item(&stored_key)?;
                Some((stored_key, logical, raw))
            })
            .collect()
    }
}

/// First segment of a cache key, naming the resource family.
fn family_of(key: &str) -> &str {
    key.split(':').next().unwrap_or(key)
}
