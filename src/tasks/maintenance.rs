//! Cache Maintenance Task
//!
//! Optional periodic sweep of expired entries. Reads already treat expired
//! entries as absent, so nothing depends on this running; long-lived
//! sessions use it to keep the durable file from accumulating dead
//! entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheService;

/// Spawns a task that prunes expired entries from both cache tiers every
/// `interval`.
///
/// Returns the task's `JoinHandle`; abort it during shutdown.
pub fn spawn_prune_task(cache: Arc<CacheService>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "cache prune task running every {}s",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.prune_expired();
            if removed > 0 {
                info!("cache prune removed {} expired entries", removed);
            } else {
                debug!("cache prune found nothing expired");
            }
        }
    })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prune_task_removes_expired_entries() {
        let cache = Arc::new(CacheService::in_memory());
        cache.set("dead", &1, Duration::from_millis(20));
        cache.set("live", &2, Duration::from_secs(60));

        let handle = spawn_prune_task(cache.clone(), Duration::from_millis(40));
        tokio::time::sleep(Duration::from_millis(120)).await;
        handle.abort();

        let stats = cache.stats();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.entries[0].key, "live");
    }

    #[tokio::test]
    async fn test_prune_task_aborts_cleanly() {
        let cache = Arc::new(CacheService::in_memory());
        let handle = spawn_prune_task(cache, Duration::from_secs(3600));

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
    }
}
