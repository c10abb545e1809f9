//! Expiry Cleanup Task
//!
//! Background task that periodically purges expired cache entries. Only
//! useful when the cache is configured with a TTL.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that purges expired entries every
/// `cleanup_interval_secs` seconds.
///
/// Returns the task handle so the caller can abort it on shutdown. An interval
/// of 0 is treated as 1 second.
///
/// # Example
/// ```ignore
/// let cache: SharedCache<Value> = SharedCache::new(CacheStore::new(1000, Some(300)));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(cache: SharedCache<V>, cleanup_interval_secs: u64) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            "starting cache expiry cleanup task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired().await;
            if removed > 0 {
                info!(removed, "cache cleanup removed expired entries");
            } else {
                debug!("cache cleanup: no expired entries");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache: SharedCache<String> = SharedCache::new(CacheStore::new(100, Some(1)));
        cache.set("categories", "list".to_string()).await;

        let handle = spawn_cleanup_task(cache.clone(), 1);

        tokio::time::sleep(Duration::from_millis(2500)).await;

        // Checked via len so the lookup path does not do the removal itself
        assert_eq!(cache.len().await, 0);
        assert!(cache.stats().await.expirations >= 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_entries_without_ttl() {
        let cache: SharedCache<String> = SharedCache::new(CacheStore::new(100, None));
        cache.set("categories", "list".to_string()).await;

        let handle = spawn_cleanup_task(cache.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.get("categories").await, Some("list".to_string()));

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache: SharedCache<String> = SharedCache::unbounded();

        let handle = spawn_cleanup_task(cache, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished());
    }
}
