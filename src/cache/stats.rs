//! Cache Statistics Module
//!
//! Observability report for the cache facade: entry counts, hit/miss
//! counters, and per-entry remaining TTLs. Never used for correctness
//! decisions.

use serde::Serialize;

// == Entry Snapshot ==
/// Diagnostic view of one live cache entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySnapshot {
    /// The cache key
    pub key: String,
    /// Remaining time to expiry in milliseconds, clamped to >= 0
    pub ms_until_expiry: u64,
}

// == Cache Stats ==
/// Point-in-time cache report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of live entries in the in-process tier
    pub count: usize,
    /// Successful reads since the cache was constructed
    pub hits: u64,
    /// Missed reads since the cache was constructed
    pub misses: u64,
    /// Per-entry remaining TTLs, sorted by key
    pub entries: Vec<EntrySnapshot>,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_no_reads() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let stats = CacheStats {
            hits: 3,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 1.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = CacheStats {
            hits: 1,
            misses: 1,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 0.5);
    }
}
