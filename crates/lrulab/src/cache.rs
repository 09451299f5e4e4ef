//! IntCache: integer-keyed LRU cache with a sentinel miss value
//!
//! This is the contract callers drive: `get` answers [`NOT_FOUND`] on a miss
//! and `put` never fails. Construction is the only fallible step.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lru::{LruCache, PutOutcome};

/// Returned by [`IntCache::get`] when the key is not cached
pub const NOT_FOUND: i64 = -1;

/// Fixed-capacity LRU cache over `i64` keys and values
pub struct IntCache {
    inner: LruCache<i64, i64>,
}

impl IntCache {
    /// Create a cache holding at most `capacity` entries
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries, must be positive
    ///
    /// # Returns
    /// * `Result<IntCache>` - Empty cache, or `Error::InvalidCapacity`
    pub fn new(capacity: i64) -> Result<Self> {
        if capacity <= 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        // Slots are allocated on demand, so saturating on 32-bit targets is harmless
        let slots = usize::try_from(capacity).unwrap_or(usize::MAX);

        Ok(Self {
            inner: LruCache::new(slots)?,
        })
    }

    /// Get the value for `key`, or [`NOT_FOUND`]
    ///
    /// A hit marks the key most recently used; a miss changes nothing.
    pub fn get(&mut self, key: i64) -> i64 {
        self.lookup(key).unwrap_or(NOT_FOUND)
    }

    /// Same as [`IntCache::get`], but distinguishes a stored `-1` from a miss
    pub fn lookup(&mut self, key: i64) -> Option<i64> {
        self.inner.get(&key).copied()
    }

    /// Read a value without touching recency
    pub fn peek(&self, key: i64) -> Option<i64> {
        self.inner.peek(&key).copied()
    }

    /// Check for a key without touching recency
    pub fn contains(&self, key: i64) -> bool {
        self.inner.contains(&key)
    }

    /// Insert or overwrite `key`, evicting the least recently used entry if full
    pub fn put(&mut self, key: i64, value: i64) {
        self.inner.put(key, value);
    }

    /// Like [`IntCache::put`], reporting whether it inserted, updated or evicted
    pub fn put_tracked(&mut self, key: i64, value: i64) -> PutOutcome<i64, i64> {
        self.inner.put(key, value)
    }

    /// Entries as `(key, value)`, most recently used first
    pub fn describe(&self) -> Vec<(i64, i64)> {
        self.inner.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Serializable view of the current state, most recently used first
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            capacity: self.capacity(),
            entries: self
                .inner
                .iter()
                .map(|(k, v)| SnapshotEntry { key: *k, value: *v })
                .collect(),
        }
    }

    /// Current state as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.snapshot())
    }

    /// Key that the next eviction would drop
    pub fn lru_key(&self) -> Option<i64> {
        self.inner.lru_key().copied()
    }

    /// Get current number of entries
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

/// Renders `{key:value, ...}`, most recently used first
impl fmt::Display for IntCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.inner.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}:{}", key, value)?;
        }
        f.write_str("}")
    }
}

impl fmt::Debug for IntCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntCache")
            .field("capacity", &self.capacity())
            .field("entries", &self.inner)
            .finish()
    }
}

/// Point-in-time copy of a cache's contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Maximum number of entries
    pub capacity: usize,
    /// Entries, most recently used first
    pub entries: Vec<SnapshotEntry>,
}

/// One cached pair inside a [`Snapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Entry key
    pub key: i64,
    /// Entry value
    pub value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_non_positive_capacity() {
        assert_eq!(IntCache::new(0).err(), Some(Error::InvalidCapacity(0)));
        assert_eq!(IntCache::new(-4).err(), Some(Error::InvalidCapacity(-4)));
        assert!(IntCache::new(1).is_ok());
    }

    #[test]
    fn test_largest_capacity_accepted() {
        let mut cache = IntCache::new(i64::MAX).unwrap();

        cache.put(1, 1);
        let expected = (i64::MAX as u128).min(usize::MAX as u128);
        assert_eq!(cache.capacity() as u128, expected);
        assert_eq!(cache.get(1), 1);
    }

    #[test]
    fn test_scenario_eviction_order() {
        let mut cache = IntCache::new(2).unwrap();

        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.get(1), 1);
        cache.put(3, 3); // evicts 2
        assert_eq!(cache.get(2), NOT_FOUND);
        cache.put(4, 4); // evicts 1
        assert_eq!(cache.get(1), NOT_FOUND);
        assert_eq!(cache.get(3), 3);
        assert_eq!(cache.get(4), 4);
    }

    #[test]
    fn test_scenario_update_is_not_insert() {
        let mut cache = IntCache::new(2).unwrap();

        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.get(1), 1);
        assert_eq!(cache.put_tracked(1, 3), PutOutcome::Updated);
        assert_eq!(cache.get(1), 3);
        assert_eq!(cache.get(2), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_scenario_single_slot() {
        let mut cache = IntCache::new(1).unwrap();

        cache.put(1, 1);
        assert_eq!(cache.put_tracked(2, 2), PutOutcome::Evicted(1, 1));
        assert_eq!(cache.get(1), NOT_FOUND);
        assert_eq!(cache.get(2), 2);
    }

    #[test]
    fn test_miss_leaves_order() {
        let mut cache = IntCache::new(2).unwrap();

        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.get(7), NOT_FOUND);
        assert_eq!(cache.lru_key(), Some(1));
    }

    #[test]
    fn test_lookup_separates_stored_sentinel() {
        let mut cache = IntCache::new(2).unwrap();

        cache.put(5, NOT_FOUND);
        assert_eq!(cache.get(5), NOT_FOUND);
        assert_eq!(cache.lookup(5), Some(NOT_FOUND));
        assert_eq!(cache.lookup(6), None);
    }

    #[test]
    fn test_describe_and_display() {
        let mut cache = IntCache::new(3).unwrap();
        assert_eq!(cache.to_string(), "{}");

        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(3, 30);
        cache.get(1);

        assert_eq!(cache.describe(), vec![(1, 10), (3, 30), (2, 20)]);
        assert_eq!(cache.to_string(), "{1:10, 3:30, 2:20}");
    }

    #[test]
    fn test_json_snapshot() {
        let mut cache = IntCache::new(2).unwrap();
        cache.put(1, 1);
        cache.put(2, -2);

        let json = cache.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"capacity":2,"entries":[{"key":2,"value":-2},{"key":1,"value":1}]}"#
        );

        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cache.snapshot());
    }

    #[test]
    fn test_peek_does_not_promote() {
        let mut cache = IntCache::new(2).unwrap();

        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.peek(1), Some(1));
        assert!(cache.contains(1));
        cache.put(3, 3);
        assert!(!cache.contains(1));
    }

    proptest! {
        /// Property: repeated gets keep returning the stored value
        #[test]
        fn prop_get_never_changes_values(
            entries in prop::collection::vec((0i64..16, 0i64..1000), 1..16),
            probes in prop::collection::vec(0i64..16, 1..32)
        ) {
            let mut cache = IntCache::new(16).unwrap();
            for &(k, v) in &entries {
                cache.put(k, v);
            }
            let before: std::collections::HashMap<i64, i64> =
                cache.describe().into_iter().collect();

            for key in probes {
                let first = cache.get(key);
                let second = cache.get(key);
                prop_assert_eq!(first, second);
                prop_assert_eq!(first, before.get(&key).copied().unwrap_or(NOT_FOUND));
            }
        }

        /// Property: size never exceeds capacity
        #[test]
        fn prop_len_within_capacity(
            capacity in 1i64..8,
            puts in prop::collection::vec((any::<i64>(), any::<i64>()), 0..64)
        ) {
            let mut cache = IntCache::new(capacity).unwrap();
            for (k, v) in puts {
                cache.put(k, v);
                prop_assert!(cache.len() as i64 <= capacity);
            }
        }
    }
}
