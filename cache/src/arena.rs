//! Fixed-capacity storage with an explicit recency order.
//!
//! Entries live in an arena of slots; a doubly linked list threaded through the
//! slots orders them from most- to least-recently used, and a hash index maps
//! keys to slots. Every operation is O(1) except [`RecencyArena::keys_by_recency`].
//!
//! Eviction is never implicit in reads: [`RecencyArena::insert`] evicts exactly
//! one least-recently-used entry when a *new* key would exceed capacity, and
//! [`RecencyArena::evict_lru`] is available for explicit use.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug)]
struct Slot<K, V> {
    key: K,
    value: V,
    /// Towards the most recently used end
    prev: Option<usize>,
    /// Towards the least recently used end
    next: Option<usize>,
}

/// LRU-ordered key/value arena.
#[derive(Debug)]
pub struct RecencyArena<K, V> {
    slots: Vec<Option<Slot<K, V>>>,
    free: Vec<usize>,
    index: HashMap<K, usize>,
    /// Most recently used
    head: Option<usize>,
    /// Least recently used
    tail: Option<usize>,
    capacity: usize,
}

impl<K, V> RecencyArena<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create an arena holding at most `capacity` entries (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            index: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
            capacity,
        }
    }

    /// Maximum number of entries
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the arena holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether `key` is present
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Read a value without changing recency.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.slot(idx).map(|slot| &slot.value)
    }

    /// Promote `key` to most recently used. Returns whether it was present.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key).copied() {
            Some(idx) => {
                self.promote(idx);
                true
            },
            None => false,
        }
    }

    /// Insert or overwrite `key`, promoting it to most recently used.
    ///
    /// Overwriting an existing key never evicts. Inserting a new key into a
    /// full arena first evicts the least recently used entry, which is
    /// returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(idx) = self.index.get(&key).copied() {
            if let Some(slot) = self.slot_mut(idx) {
                slot.value = value;
            }
            self.promote(idx);
            return None;
        }

        let evicted = if self.index.len() >= self.capacity {
            self.evict_lru()
        } else {
            None
        };

        let slot = Slot {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(slot);
                idx
            },
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            },
        };
        self.index.insert(key, idx);
        self.attach_front(idx);

        evicted
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.index.remove(key)?;
        self.release(idx).map(|slot| slot.value)
    }

    /// Evict the least recently used entry.
    pub fn evict_lru(&mut self) -> Option<(K, V)> {
        let idx = self.tail?;
        let slot = self.release(idx)?;
        self.index.remove(&slot.key);
        Some((slot.key, slot.value))
    }

    /// Keys ordered from most to least recently used.
    #[must_use]
    pub fn keys_by_recency(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let Some(slot) = self.slot(idx) else { break };
            keys.push(slot.key.clone());
            cursor = slot.next;
        }
        keys
    }

    fn slot(&self, idx: usize) -> Option<&Slot<K, V>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, idx: usize) -> Option<&mut Slot<K, V>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn promote(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.detach(idx);
        self.attach_front(idx);
    }

    fn detach(&mut self, idx: usize) {
        let Some((prev, next)) = self.slot(idx).map(|slot| (slot.prev, slot.next)) else {
            return;
        };

        match prev {
            Some(prev) => {
                if let Some(slot) = self.slot_mut(prev) {
                    slot.next = next;
                }
            },
            None => self.head = next,
        }
        match next {
            Some(next) => {
                if let Some(slot) = self.slot_mut(next) {
                    slot.prev = prev;
                }
            },
            None => self.tail = prev,
        }

        if let Some(slot) = self.slot_mut(idx) {
            slot.prev = None;
            slot.next = None;
        }
    }

    fn attach_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(slot) = self.slot_mut(idx) {
            slot.prev = None;
            slot.next = old_head;
        }
        if let Some(old_head) = old_head {
            if let Some(slot) = self.slot_mut(old_head) {
                slot.prev = Some(idx);
            }
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn release(&mut self, idx: usize) -> Option<Slot<K, V>> {
        self.detach(idx);
        let slot = self.slots.get_mut(idx).and_then(Option::take);
        if slot.is_some() {
            self.free.push(idx);
        }
        slot
    }
}
