//! LRU (Least Recently Used) cache core
//!
//! Entries live in an arena addressed by index. Recency is a doubly-linked
//! list threaded through the arena between two sentinel slots, so linking
//! and unlinking only ever touch neighbours.
//!
//! ```text
//!   slot 0 (HEAD) <-> [MRU] <-> ... <-> [LRU] <-> slot 1 (TAIL)
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use ahash::RandomState;

use crate::error::{Error, Result};

const HEAD: usize = 0;
const TAIL: usize = 1;

/// Upper bound on up-front allocation; larger caches grow on demand.
const PREALLOC_LIMIT: usize = 4096;

/// Arena slot. Sentinels carry no entry.
struct Slot<K, V> {
    entry: Option<(K, V)>,
    prev: usize,
    next: usize,
}

impl<K, V> Slot<K, V> {
    fn sentinel() -> Self {
        Self {
            entry: None,
            prev: HEAD,
            next: TAIL,
        }
    }
}

/// What a [`LruCache::put`] did to the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome<K, V> {
    /// New key stored below capacity
    Inserted,
    /// Existing key overwritten in place
    Updated,
    /// New key stored after dropping the least recently used entry
    Evicted(K, V),
}

/// LRU cache with fixed capacity
pub struct LruCache<K, V> {
    map: HashMap<K, usize, RandomState>,
    slots: Vec<Slot<K, V>>,
    free_list: Vec<usize>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU cache with the given capacity
    ///
    /// # Errors
    /// * `Error::InvalidCapacity` - capacity is zero
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(0));
        }

        let prealloc = capacity.min(PREALLOC_LIMIT);
        let mut slots = Vec::with_capacity(prealloc + 2);
        slots.push(Slot::sentinel());
        slots.push(Slot::sentinel());

        Ok(Self {
            map: HashMap::with_capacity_and_hasher(prealloc, RandomState::new()),
            slots,
            free_list: Vec::new(),
            capacity,
        })
    }

    /// Get a value and mark it most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.value_at(idx)
    }

    /// Get a value without touching recency
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.value_at(idx)
    }

    /// Check for a key without touching recency
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Insert or overwrite a key, marking it most recently used
    ///
    /// At capacity, a new key first evicts the least recently used entry,
    /// which is handed back in [`PutOutcome::Evicted`].
    pub fn put(&mut self, key: K, value: V) -> PutOutcome<K, V> {
        if let Some(&idx) = self.map.get(&key) {
            if let Some((_, slot_value)) = self.slots[idx].entry.as_mut() {
                *slot_value = value;
            }
            self.move_to_front(idx);
            return PutOutcome::Updated;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.evict()
        } else {
            None
        };

        let idx = self.alloc_slot(key.clone(), value);
        self.link_front(idx);
        self.map.insert(key, idx);

        match evicted {
            Some((key, value)) => PutOutcome::Evicted(key, value),
            None => PutOutcome::Inserted,
        }
    }

    /// Key of the most recently used entry
    pub fn mru_key(&self) -> Option<&K> {
        self.key_at(self.slots[HEAD].next)
    }

    /// Key of the least recently used entry (next to be evicted)
    pub fn lru_key(&self) -> Option<&K> {
        self.key_at(self.slots[TAIL].prev)
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.slots[HEAD].next == idx {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let idx = self.slots[TAIL].prev;
        if idx == HEAD {
            return None;
        }

        self.unlink(idx);
        let (key, value) = self.slots[idx].entry.take()?;
        self.map.remove(&key);
        self.free_list.push(idx);
        Some((key, value))
    }
}

impl<K, V> LruCache<K, V> {
    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate entries from most to least recently used
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            cursor: self.slots[HEAD].next,
            remaining: self.map.len(),
        }
    }

    fn value_at(&self, idx: usize) -> Option<&V> {
        self.slots[idx].entry.as_ref().map(|(_, value)| value)
    }

    fn key_at(&self, idx: usize) -> Option<&K> {
        self.slots[idx].entry.as_ref().map(|(key, _)| key)
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        self.slots[prev].next = next;
        self.slots[next].prev = prev;
    }

    fn link_front(&mut self, idx: usize) {
        let first = self.slots[HEAD].next;
        self.slots[idx].prev = HEAD;
        self.slots[idx].next = first;
        self.slots[first].prev = idx;
        self.slots[HEAD].next = idx;
    }

    fn alloc_slot(&mut self, key: K, value: V) -> usize {
        let slot = Slot {
            entry: Some((key, value)),
            prev: HEAD,
            next: TAIL,
        };

        match self.free_list.pop() {
            Some(idx) => {
                self.slots[idx] = slot;
                idx
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over cache entries, most recently used first
pub struct Iter<'a, K, V> {
    slots: &'a [Slot<K, V>],
    cursor: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let slot = &self.slots[self.cursor];
        self.cursor = slot.next;
        self.remaining -= 1;
        slot.entry.as_ref().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a LruCache<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
{
    /// Walk the list both ways and cross-check it against the map.
    fn assert_invariants(&self) {
        assert!(self.len() <= self.capacity, "len exceeds capacity");

        let mut forward = 0;
        let mut prev = HEAD;
        let mut idx = self.slots[HEAD].next;
        while idx != TAIL {
            assert_eq!(self.slots[idx].prev, prev, "broken back link at {}", idx);
            let key = self.key_at(idx).expect("linked slot without entry");
            assert_eq!(self.map.get(key), Some(&idx), "map disagrees for {:?}", key);
            forward += 1;
            assert!(forward <= self.len(), "list longer than map");
            prev = idx;
            idx = self.slots[idx].next;
        }
        assert_eq!(self.slots[TAIL].prev, prev);
        assert_eq!(forward, self.len(), "list and map sizes differ");

        for &free in &self.free_list {
            assert!(self.slots[free].entry.is_none(), "free slot {} still holds an entry", free);
        }
    }
}
