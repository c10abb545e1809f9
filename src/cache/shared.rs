//! Shared Cache Handle
//!
//! Cloneable, injectable handle over a [`CacheStore`] plus the read-through
//! helpers used by request handlers.

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheStats, CacheStore};

// == Shared Cache ==
/// Thread-safe cache handle shared by every in-flight request.
///
/// Cloning is cheap and every clone sees the same entries. Build one per
/// process (or per test) and pass it through application state.
///
/// No operation on this type returns an error: a key the store rejects is
/// logged and the value is simply not cached.
#[derive(Debug)]
pub struct SharedCache<V> {
    inner: Arc<RwLock<CacheStore<V>>>,
}

impl<V> Clone for SharedCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone + Send + Sync> SharedCache<V> {
    pub fn new(store: CacheStore<V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(CacheStore::unbounded())
    }

    // == Get ==
    /// Returns the value under `key`, or `None` on a miss.
    ///
    /// Takes the write lock since a lookup updates LRU order and stats.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.lookup_with(key, |value| Some(value.clone())).await.0
    }

    /// Looks up `key` through `read` and returns the invalidation epoch seen
    /// under the same lock.
    async fn lookup_with<T>(
        &self,
        key: &str,
        read: impl FnOnce(&V) -> Option<T>,
    ) -> (Option<T>, u64) {
        let mut store = self.inner.write().await;
        let value = store.get_with(key, read);
        debug!(key, hit = value.is_some(), "cache lookup");
        (value, store.epoch())
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        if let Err(err) = self.inner.write().await.set(key.as_str(), value) {
            warn!(key = %key, error = %err, "value not cached");
        }
    }

    // == Read Through ==
    /// Returns the cached value for `key`, populating it from `populate` on a miss.
    ///
    /// The lock is released while `populate` runs, so concurrent misses on the
    /// same key each call their own `populate`; the last one to finish wins.
    /// A result is not stored if the cache was invalidated while `populate`
    /// ran, so a write made before the invalidation cannot resurface.
    /// A failed `populate` is returned as-is and leaves the cache untouched.
    pub async fn get_or_try_populate<F, Fut, E>(&self, key: &str, populate: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let (cached, epoch) = self.lookup_with(key, |value| Some(value.clone())).await;
        if let Some(value) = cached {
            return Ok(value);
        }

        let value = populate().await?;
        self.set_if_epoch(key, value.clone(), epoch).await;
        Ok(value)
    }

    /// Writes a freshly populated value unless the cache was invalidated
    /// after the miss that triggered the population.
    async fn set_if_epoch(&self, key: &str, value: V, epoch: u64) {
        if let Err(err) = self.inner.write().await.set_if_epoch(key, value, epoch) {
            warn!(key, error = %err, "value not cached");
        }
    }

    // == Invalidation ==
    pub async fn invalidate(&self, key: &str) -> bool {
        let removed = self.inner.write().await.invalidate(key);
        debug!(key, removed, "cache invalidate");
        removed
    }

    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.inner.write().await.invalidate_prefix(prefix)
    }

    pub async fn clear(&self) -> usize {
        self.inner.write().await.clear()
    }

    /// Purges expired entries. Returns the number removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.inner.write().await.cleanup_expired()
    }

    // == Introspection ==
    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl<V: Clone + Send + Sync> Default for SharedCache<V> {
    fn default() -> Self {
        Self::unbounded()
    }
}

// == JSON Payloads ==
/// Typed access for caches holding JSON documents.
///
/// Different keys can hold different record shapes; each caller must read a
/// key back with the type it wrote. A payload that no longer decodes as `T`
/// is dropped and counted as a miss.
impl SharedCache<Value> {
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.lookup_json(key).await.0
    }

    async fn lookup_json<T: DeserializeOwned>(&self, key: &str) -> (Option<T>, u64) {
        self.lookup_with(key, |value| match T::deserialize(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(key, error = %err, "cached payload has unexpected shape, treating as miss");
                None
            }
        })
        .await
    }

    pub async fn set_json<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(encoded) => self.set(key, encoded).await,
            Err(err) => warn!(key = %key, error = %err, "value not serializable, not cached"),
        }
    }

    /// JSON flavour of [`get_or_try_populate`](Self::get_or_try_populate).
    pub async fn read_through_json<T, F, Fut, E>(&self, key: &str, populate: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let (cached, epoch) = self.lookup_json(key).await;
        if let Some(value) = cached {
            return Ok(value);
        }

        let value = populate().await?;
        match serde_json::to_value(&value) {
            Ok(encoded) => self.set_if_epoch(key, encoded, epoch).await,
            Err(err) => warn!(key, error = %err, "value not serializable, not cached"),
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Category {
        id: String,
        name: String,
    }

    fn metal() -> Vec<Category> {
        vec![Category {
            id: "1".to_string(),
            name: "Metal".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache: SharedCache<String> = SharedCache::unbounded();
        let other = cache.clone();

        cache.set("categories", "list".to_string()).await;

        assert_eq!(other.get("categories").await, Some("list".to_string()));
    }

    #[tokio::test]
    async fn test_separate_instances_are_isolated() {
        let a: SharedCache<u32> = SharedCache::unbounded();
        let b: SharedCache<u32> = SharedCache::unbounded();

        a.set("categories", 1).await;

        assert_eq!(b.get("categories").await, None);
    }

    #[tokio::test]
    async fn test_rejected_key_is_swallowed() {
        let cache: SharedCache<u32> = SharedCache::unbounded();

        cache.set("", 1).await;

        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_categories_roundtrip_as_json() {
        let cache: SharedCache<Value> = SharedCache::unbounded();

        cache.set_json("categories", &metal()).await;

        let cached: Option<Vec<Category>> = cache.get_json("categories").await;
        assert_eq!(cached, Some(metal()));
        assert_eq!(
            cache.get("categories").await,
            Some(json!([{"id": "1", "name": "Metal"}]))
        );
    }

    #[tokio::test]
    async fn test_wrong_shape_reads_as_miss() {
        let cache: SharedCache<Value> = SharedCache::unbounded();
        cache.set("categories", json!({"unexpected": true})).await;

        let cached: Option<Vec<Category>> = cache.get_json("categories").await;
        assert_eq!(cached, None);

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
        assert!(cache.is_empty().await, "undecodable payload should be dropped");
    }

    #[tokio::test]
    async fn test_wrong_shape_is_repopulated() {
        let cache: SharedCache<Value> = SharedCache::unbounded();
        cache.set("categories", json!("garbage")).await;

        let result: Result<Vec<Category>, ()> = cache
            .read_through_json("categories", || async { Ok(metal()) })
            .await;

        assert_eq!(result, Ok(metal()));
        assert_eq!(cache.get_json::<Vec<Category>>("categories").await, Some(metal()));
        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_invalidation_during_populate_discards_result() {
        let cache: SharedCache<Value> = SharedCache::unbounded();
        let writer = cache.clone();

        let result: Result<Vec<Category>, ()> = cache
            .read_through_json("categories", || async move {
                let snapshot = metal();
                // A concurrent write lands after the snapshot was taken
                writer.invalidate("categories").await;
                Ok(snapshot)
            })
            .await;

        assert_eq!(result, Ok(metal()));
        assert!(cache.is_empty().await, "stale snapshot must not be cached");

        let result: Result<Vec<Category>, ()> = cache
            .read_through_json("categories", || async { Ok(Vec::new()) })
            .await;
        assert_eq!(result, Ok(Vec::new()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_populate_unaffected_without_invalidation() {
        let cache: SharedCache<u32> = SharedCache::unbounded();
        let other = cache.clone();

        let value = cache
            .get_or_try_populate("materials", || async move {
                other.set("materials_metal", 7).await;
                Ok::<_, ()>(1)
            })
            .await;

        assert_eq!(value, Ok(1));
        assert_eq!(cache.get("materials").await, Some(1));
    }

    #[tokio::test]
    async fn test_read_through_populates_once() {
        let cache: SharedCache<Value> = SharedCache::unbounded();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let result: Result<Vec<Category>, String> = cache
                .read_through_json("categories", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(metal())
                })
                .await;
            assert_eq!(result.unwrap(), metal());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
    }

    #[tokio::test]
    async fn test_failed_populate_is_not_cached() {
        let cache: SharedCache<Vec<String>> = SharedCache::unbounded();

        let result = cache
            .get_or_try_populate("materials", || async { Err::<Vec<String>, _>("db down") })
            .await;
        assert_eq!(result, Err("db down"));
        assert!(cache.is_empty().await);

        let result = cache
            .get_or_try_populate("materials", || async {
                Ok::<_, &str>(vec!["Steel".to_string()])
            })
            .await;
        assert_eq!(result, Ok(vec!["Steel".to_string()]));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_repopulate() {
        let cache: SharedCache<u32> = SharedCache::unbounded();
        cache.set("categories", 1).await;

        assert!(cache.invalidate("categories").await);

        let value = cache
            .get_or_try_populate("categories", || async { Ok::<_, ()>(2) })
            .await;
        assert_eq!(value, Ok(2));
    }

    #[tokio::test]
    async fn test_invalidate_prefix_and_clear() {
        let cache: SharedCache<u32> = SharedCache::unbounded();
        cache.set("materials", 0).await;
        cache.set("materials_metal", 1).await;
        cache.set("materials_wood", 2).await;
        cache.set("categories", 3).await;

        assert_eq!(cache.invalidate_prefix("materials_").await, 2);
        assert_eq!(cache.get("materials").await, Some(0));

        assert_eq!(cache.clear().await, 2);
        assert!(cache.is_empty().await);
        assert_eq!(cache.stats().await.invalidations, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_access() {
        let cache: SharedCache<usize> = SharedCache::unbounded();

        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("materials_cat{i}");
                cache.set(key.clone(), i).await;
                cache.get(&key).await
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), Some(i));
        }
        assert_eq!(cache.len().await, 16);
    }
}
