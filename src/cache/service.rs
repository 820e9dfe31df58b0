//! Cache Facade Module
//!
//! The public cache contract: get/set/invalidate/invalidate_pattern/clear/
//! stats over a two-tier lookup. The in-process Entry Store answers first;
//! the Durable Mirror backs it up across restarts.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, DiskMirror, EntryStore, KeyPattern, TtlClass};
use crate::config::Config;
use crate::storage::FileStore;

// == Set Options ==
/// Per-write cache options: how long the entry lives and whether it is
/// mirrored to durable storage.
///
/// Both `Duration` and [`TtlClass`] convert into options with persistence
/// on, so call sites usually pass one of those directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOptions {
    /// How long the entry stays live
    pub ttl: Duration,
    /// Mirror the entry to durable storage
    pub persist: bool,
}

impl SetOptions {
    /// Options with the given TTL, persisted to the durable tier.
    pub fn ttl(ttl: Duration) -> Self {
        Self { ttl, persist: true }
    }

    /// Switches persistence off, keeping the entry memory-only.
    pub fn memory_only(mut self) -> Self {
        self.persist = false;
        self
    }
}

impl From<Duration> for SetOptions {
    fn from(ttl: Duration) -> Self {
        Self::ttl(ttl)
    }
}

impl From<TtlClass> for SetOptions {
    fn from(class: TtlClass) -> Self {
        Self::ttl(class.duration())
    }
}

// == Cache Service ==
/// Two-tier cache facade.
///
/// Reads check the in-process tier first and fall back to the durable
/// mirror, warming the fast tier on a durable hit. An expired entry is
/// treated as absent wherever it is observed and removed from both tiers.
/// Every operation is synchronous and non-suspending, and none of them
/// fail for ordinary misses or storage trouble; the only error a caller
/// ever handles is from whatever populates the cache, upstream of `set`.
///
/// Construct one instance at application start and hand it to the resource
/// stores; tests build a fresh instance each for isolation.
#[derive(Debug)]
pub struct CacheService {
    memory: RwLock<EntryStore>,
    mirror: Option<DiskMirror>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheService {
    // == Constructors ==
    /// Creates a cache without a durable tier.
    pub fn in_memory() -> Self {
        Self {
            memory: RwLock::new(EntryStore::new()),
            mirror: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a cache mirrored into the given storage medium.
    pub fn with_storage(store: Arc<FileStore>) -> Self {
        Self {
            memory: RwLock::new(EntryStore::new()),
            mirror: Some(DiskMirror::new(store)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a cache according to the configuration: durable when
    /// `persist` is set, memory-only otherwise.
    pub fn from_config(config: &Config) -> Self {
        if config.persist {
            info!("cache persisting to {}", config.cache_path.display());
            Self::with_storage(Arc::new(FileStore::open(&config.cache_path)))
        } else {
            info!("cache running memory-only");
            Self::in_memory()
        }
    }

    // == Get ==
    /// Returns the value under `key`, or `None` on a miss.
    ///
    /// Lookup order: in-process tier, then durable mirror. A durable hit
    /// re-inserts the entry into the fast tier so the next read skips the
    /// disk. After a miss (absent, expired, or undecodable in either
    /// tier), neither tier still holds the key.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        // The read path takes the write lock: expiry removal and tier
        // warming both mutate the entry store.
        let mut memory = self.write_store();

        if let Some(entry) = memory.get(key) {
            return self.decode(key, entry, &mut memory);
        }

        if let Some(mirror) = &self.mirror {
            if let Some(entry) = mirror.read(key) {
                debug!("cache warmed from durable tier: {}", key);
                memory.insert(key, entry.clone());
                return self.decode(key, entry, &mut memory);
            }
        }

        // Miss in both tiers; leave no leftover state behind
        memory.remove(key);
        if let Some(mirror) = &self.mirror {
            mirror.remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("cache miss: {}", key);
        None
    }

    // == Set ==
    /// Stores `value` under `key`; last write wins, no merging.
    ///
    /// The entry always lands in the in-process tier. With
    /// `options.persist` (the default) it is also mirrored to durable
    /// storage, where a failure merely downgrades this entry to
    /// memory-only. A memory-only write removes any durable copy left by
    /// an earlier persisted write, so a replaced entry can never resurface
    /// from the mirror. A value that fails JSON encoding is dropped with a
    /// warning; cache writes are best-effort by contract.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, options: impl Into<SetOptions>) {
        let options = options.into();
        let data = match serde_json::to_value(value) {
            Ok(data) => data,
            Err(err) => {
                warn!("value for cache key {} not encodable, skipping: {}", key, err);
                return;
            }
        };

        let entry = CacheEntry::new(data, options.ttl);
        self.write_store().insert(key, entry.clone());

        if let Some(mirror) = &self.mirror {
            if options.persist {
                mirror.write(key, &entry);
            } else {
                // Last write wins across both tiers: a stale durable copy
                // must not outlive the entry that replaced it
                mirror.remove(key);
            }
        }
        debug!(
            "cache set: {} (ttl {}ms, persist {})",
            key,
            options.ttl.as_millis(),
            options.persist
        );
    }

    // == Invalidate ==
    /// Removes the entry under `key` from both tiers.
    pub fn invalidate(&self, key: &str) {
        self.write_store().remove(key);
        if let Some(mirror) = &self.mirror {
            mirror.remove(key);
        }
        debug!("cache invalidated: {}", key);
    }

    // == Invalidate Pattern ==
    /// Removes every entry matching `pattern` from both tiers.
    ///
    /// Linear in the number of stored keys, which stays bounded by the
    /// dashboard's working set rather than database size.
    ///
    /// Returns the number of distinct keys removed.
    pub fn invalidate_pattern(&self, pattern: &KeyPattern) -> usize {
        let mut removed: HashSet<String> = self
            .write_store()
            .remove_where(|key| pattern.matches(key))
            .into_iter()
            .collect();

        if let Some(mirror) = &self.mirror {
            removed.extend(mirror.remove_where(|key| pattern.matches(key)));
        }

        if !removed.is_empty() {
            debug!("cache invalidated {} keys matching {}", removed.len(), pattern);
        }
        removed.len()
    }

    // == Clear ==
    /// Empties both tiers.
    ///
    /// Durable items outside the cache's reserved prefix are untouched.
    pub fn clear(&self) {
        let memory_dropped = self.write_store().clear();
        let durable_dropped = match &self.mirror {
            Some(mirror) => mirror.clear(),
            None => 0,
        };
        info!(
            "cache cleared ({} memory entries, {} durable entries)",
            memory_dropped, durable_dropped
        );
    }

    // == Stats ==
    /// Returns the observability report: live entry count, hit/miss
    /// counters, and remaining TTL per entry in the in-process tier.
    ///
    /// Purely diagnostic; nothing may base correctness decisions on it.
    pub fn stats(&self) -> CacheStats {
        let entries = self.read_store().snapshot();
        CacheStats {
            count: entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        }
    }

    // == Prune Expired ==
    /// Eagerly removes expired entries from both tiers.
    ///
    /// Correctness never depends on this running: reads already treat
    /// expired entries as absent. Long-lived processes can call it on an
    /// interval (see [`crate::tasks::spawn_prune_task`]) to keep the
    /// durable file from accumulating dead entries.
    ///
    /// Returns the number of distinct keys removed.
    pub fn prune_expired(&self) -> usize {
        let mut removed: HashSet<String> = self
            .write_store()
            .prune_expired()
            .into_iter()
            .collect();

        if let Some(mirror) = &self.mirror {
            removed.extend(mirror.prune_expired());
        }

        if !removed.is_empty() {
            debug!("pruned {} expired cache entries", removed.len());
        }
        removed.len()
    }

    // == Internals ==
    /// Cached data is disposable, so a poisoned lock still holds a usable
    /// store.
    fn write_store(&self) -> RwLockWriteGuard<'_, EntryStore> {
        self.memory.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_store(&self) -> RwLockReadGuard<'_, EntryStore> {
        self.memory.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deserializes a live entry's payload, counting the read. A payload
    /// that no longer matches the requested type is dropped from both
    /// tiers and counted as a miss.
    fn decode<T: DeserializeOwned>(
        &self,
        key: &str,
        entry: CacheEntry,
        memory: &mut EntryStore,
    ) -> Option<T> {
        match serde_json::from_value(entry.data) {
            Ok(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Err(err) => {
                warn!("cached payload under {} no longer decodes, dropping it: {}", key, err);
                memory.remove(key);
                if let Some(mirror) = &self.mirror {
                    mirror.remove(key);
                }
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }
}
