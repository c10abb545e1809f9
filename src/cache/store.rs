//! Cache Store Module
//!
//! Keyed storage combining a HashMap with LRU tracking and optional expiry.
//! The store is generic over the value type and knows nothing about what the
//! keys mean.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruTracker, MAX_KEY_LENGTH};
use crate::error::CacheError;

// == Cache Store ==
/// Single-owner cache storage. Wrap it in [`SharedCache`](crate::cache::SharedCache)
/// to share it between tasks.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries, 0 = unbounded
    max_entries: usize,
    /// TTL in seconds applied to every new entry, None = never expire
    default_ttl: Option<u64>,
    /// Bumped on every invalidation
    epoch: u64,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new store.
    ///
    /// # Arguments
    /// * `max_entries` - Size bound, 0 disables eviction
    /// * `default_ttl` - Optional TTL in seconds for stored entries
    pub fn new(max_entries: usize, default_ttl: Option<u64>) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
            epoch: 0,
        }
    }

    /// An unbounded store whose entries live until invalidated.
    pub fn unbounded() -> Self {
        Self::new(0, None)
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// Overwriting resets the entry's timestamps. Inserting a new key into a
    /// full store evicts the least recently used entry first.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Result<(), CacheError> {
        let key = key.into();
        validate_key(&key)?;

        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.max_entries > 0 && self.entries.len() >= self.max_entries {
            if let Some(evicted_key) = self.lru.evict_oldest() {
                debug!(key = %evicted_key, "evicting least recently used cache entry");
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
            }
        }

        self.entries
            .insert(key.clone(), CacheEntry::new(value, self.default_ttl));
        self.lru.touch(&key);
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    /// Stores `value` only if no invalidation happened since `epoch` was read.
    ///
    /// Returns `Ok(false)` when the value was dropped because the epoch moved.
    /// Used by read-through population so a snapshot taken before an
    /// invalidation cannot be written back after it.
    pub fn set_if_epoch(
        &mut self,
        key: impl Into<String>,
        value: V,
        epoch: u64,
    ) -> Result<bool, CacheError> {
        let key = key.into();
        validate_key(&key)?;

        if self.epoch != epoch {
            debug!(key = %key, "skipping cache write, invalidated since lookup");
            return Ok(false);
        }
        self.set(key, value)?;
        Ok(true)
    }

    // == Get ==
    /// Returns a clone of the value stored under `key`.
    ///
    /// Absent and expired keys return `None` and count as misses. An expired
    /// entry is removed on the way out.
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_with(key, |value| Some(value.clone()))
    }

    /// Looks up `key` and maps the live value through `read`.
    ///
    /// When `read` returns `None` the stored value is unusable: the entry is
    /// dropped and the lookup counts as a miss, not a hit.
    pub fn get_with<T>(&mut self, key: &str, read: impl FnOnce(&V) -> Option<T>) -> Option<T> {
        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired(),
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        let read_value = self.entries.get(key).and_then(|entry| read(&entry.value));
        match read_value {
            Some(value) => {
                self.stats.record_hit();
                self.lru.touch(key);
                Some(value)
            }
            None => {
                self.remove_entry(key);
                self.stats.record_miss();
                None
            }
        }
    }

    /// Current invalidation epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // == Invalidate ==
    /// Removes the entry under `key`. Returns whether one was present.
    ///
    /// Bumps the epoch even when the key is absent, since a population for it
    /// may be in flight.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.epoch += 1;
        if self.remove_entry(key) {
            self.stats.record_invalidations(1);
            true
        } else {
            false
        }
    }

    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_prefix(&mut self, prefix: &str) -> usize {
        self.epoch += 1;
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        for key in &matching {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_invalidations(matching.len());
        self.stats.set_total_entries(self.entries.len());
        matching.len()
    }

    /// Removes all entries. Counters other than the entry count are kept.
    pub fn clear(&mut self) -> usize {
        self.epoch += 1;
        let count = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        self.stats.record_invalidations(count);
        self.stats.set_total_entries(0);
        count
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(expired_keys.len());
        self.stats.set_total_entries(self.entries.len());
        expired_keys.len()
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn default_ttl(&self) -> Option<u64> {
        self.default_ttl
    }
}

fn validate_key(key: &str) -> Result<(), CacheError> {
    if key.is_empty() {
        return Err(CacheError::EmptyKey);
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::KeyTooLong(MAX_KEY_LENGTH));
    }
    Ok(())
}
