//! SharedCache: IntCache behind one exclusive lock
//!
//! A lookup both reads the map and relinks the recency list, so reads and
//! writes take the same `Mutex`. Every call holds it for its full duration.

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{IntCache, Snapshot, NOT_FOUND};
use crate::error::Result;
use crate::lru::PutOutcome;
use crate::stats::CacheStats;

/// Thread-safe integer LRU cache with hit/miss accounting
#[derive(Debug)]
pub struct SharedCache {
    cache: Mutex<IntCache>,
    stats: CacheStats,
    capacity: usize,
}

impl SharedCache {
    /// Create a shared cache holding at most `capacity` entries
    pub fn new(capacity: i64) -> Result<Self> {
        let cache = IntCache::new(capacity)?;
        let capacity = cache.capacity();

        Ok(Self {
            cache: Mutex::new(cache),
            stats: CacheStats::new(),
            capacity,
        })
    }

    /// Get the value for `key`, or [`NOT_FOUND`]
    pub fn get(&self, key: i64) -> i64 {
        self.lookup(key).unwrap_or(NOT_FOUND)
    }

    /// Get the value for `key`, marking it most recently used
    pub fn lookup(&self, key: i64) -> Option<i64> {
        let value = self.cache.lock().lookup(key);
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    /// Read a value without touching recency or statistics
    pub fn peek(&self, key: i64) -> Option<i64> {
        self.cache.lock().peek(key)
    }

    /// Insert or overwrite `key`
    pub fn put(&self, key: i64, value: i64) {
        let outcome = self.cache.lock().put_tracked(key, value);
        if let PutOutcome::Evicted(evicted_key, evicted_value) = &outcome {
            debug!(
                key = *evicted_key,
                value = *evicted_value,
                inserted = key,
                "evicted least recently used entry"
            );
        }
        self.stats.record_put(&outcome);
    }

    /// Entries as `(key, value)`, most recently used first
    pub fn describe(&self) -> Vec<(i64, i64)> {
        self.cache.lock().describe()
    }

    /// Serializable copy of the current state
    pub fn snapshot(&self) -> Snapshot {
        self.cache.lock().snapshot()
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Get current number of entries
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_shared_rejects_bad_capacity() {
        assert_eq!(SharedCache::new(0).err(), Some(Error::InvalidCapacity(0)));
    }

    #[test]
    fn test_shared_hits_and_misses() {
        let cache = SharedCache::new(2).unwrap();

        cache.put(1, 100);
        assert_eq!(cache.get(1), 100);
        assert_eq!(cache.get(2), NOT_FOUND);

        assert_eq!(cache.stats().hits(), 1);
        assert_eq!(cache.stats().misses(), 1);
        assert_eq!(cache.stats().hit_ratio(), 0.5);
    }

    #[test]
    fn test_shared_counts_evictions() {
        let cache = SharedCache::new(2).unwrap();

        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(2, 20);
        cache.put(3, 3);

        assert_eq!(cache.stats().inserts(), 3);
        assert_eq!(cache.stats().updates(), 1);
        assert_eq!(cache.stats().evictions(), 1);
        assert_eq!(cache.describe(), vec![(3, 3), (2, 20)]);
    }

    #[test]
    fn test_shared_peek_skips_stats() {
        let cache = SharedCache::new(2).unwrap();

        cache.put(1, 1);
        assert_eq!(cache.peek(1), Some(1));
        assert_eq!(cache.peek(9), None);
        assert_eq!(cache.stats().hits(), 0);
        assert_eq!(cache.stats().misses(), 0);
    }

    #[test]
    fn test_shared_concurrent_writers() {
        let cache = Arc::new(SharedCache::new(8).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..500 {
                        let key = (t * 1000 + i) as i64;
                        cache.put(key, key);
                        cache.get(key);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 8);
        assert_eq!(cache.stats().inserts(), 2000);
        assert_eq!(cache.stats().evictions(), 2000 - 8);
        for (key, value) in cache.describe() {
            assert_eq!(key, value);
        }
    }
}
