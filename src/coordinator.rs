//! Query Coordinator Module
//!
//! The seam between this cache and the higher-level query-result layer.
//! After a confirmed remote write, resource stores mark the affected query
//! families stale here; before serving a cache hit, they check staleness so
//! a TTL-fresh entry never shadows data the coordinator knows is outdated.
//! Refetch scheduling, retries, and single-flight de-duplication all live
//! behind this trait, never in the cache itself.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::cache::KeyPattern;

// == Query Coordinator Trait ==
/// Staleness contract between resource stores and the query-result layer.
///
/// All three operations are synchronous and non-suspending, mirroring the
/// cache facade: nothing here ever awaits or fails.
pub trait QueryCoordinator: Send + Sync {
    /// Marks every key under `pattern` stale. Cached data for those keys
    /// must not be served until a refetch marks them fresh again.
    fn mark_stale(&self, pattern: &KeyPattern);

    /// Returns true if `key` has been marked stale and not refreshed since.
    fn is_stale(&self, key: &str) -> bool;

    /// Records that `key` now holds freshly fetched data.
    fn mark_fresh(&self, key: &str);
}

// == Stale Tracker ==
/// In-memory [`QueryCoordinator`] used as the default wiring and in tests.
///
/// Stale patterns accumulate as mutations happen; a key is stale while any
/// recorded pattern matches it and no later `mark_fresh` covers it. The
/// pattern set stays bounded by the number of resource families, so no
/// compaction is needed.
#[derive(Debug, Default)]
pub struct StaleTracker {
    patterns: RwLock<HashSet<KeyPattern>>,
    fresh: RwLock<HashSet<String>>,
}

impl StaleTracker {
    /// Creates an empty tracker; nothing is stale yet.
    pub fn new() -> Self {
        Self::default()
    }

    // Staleness flags are advisory, so a poisoned lock still holds usable
    // state.
    fn patterns(&self) -> std::sync::RwLockWriteGuard<'_, HashSet<KeyPattern>> {
        self.patterns.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh(&self) -> std::sync::RwLockWriteGuard<'_, HashSet<String>> {
        self.fresh.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl QueryCoordinator for StaleTracker {
    fn mark_stale(&self, pattern: &KeyPattern) {
        // Drop fresh marks the new pattern covers, then remember it
        self.fresh().retain(|key| !pattern.matches(key));
        self.patterns().insert(pattern.clone());
        debug!("queries matching {} marked stale", pattern);
    }

    fn is_stale(&self, key: &str) -> bool {
        if self.fresh().contains(key) {
            return false;
        }
        self.patterns().iter().any(|pattern| pattern.matches(key))
    }

    fn mark_fresh(&self, key: &str) {
        self.fresh().insert(key.to_string());
    }
}
