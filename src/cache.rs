//! Computed table for memoized Boolean operations.
//!
//! A direct-mapped cache from operation keys to result edges. A colliding
//! insert simply evicts the previous entry. The table doubles once the
//! number of live entries passes `table_size * rt_load_limit` (up to a fixed
//! ceiling), and is swept on every GC so that no entry can resurrect a node
//! the collector has freed.

use std::cell::Cell;

use log::debug;

use crate::utils::MyHash;

/// Growth ceiling, in entries.
const MAX_TABLE_SIZE: usize = 1 << 22;

struct Entry<K, V> {
    key: K,
    value: V,
}

pub struct Cache<K, V> {
    data: Vec<Option<Entry<K, V>>>,
    bitmask: u64,
    used: usize,
    load_limit: f64,
    next_limit: usize,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<K, V> Cache<K, V>
where
    K: MyHash + Eq,
    V: Copy,
{
    /// Create a new table of size `2^bits`.
    pub fn new(bits: usize, load_limit: f64) -> Self {
        assert!(bits <= 31, "Bits should be in the range 0..=31");

        let size = 1usize << bits;
        let mut cache = Self {
            data: std::iter::repeat_with(|| None).take(size).collect(),
            bitmask: (size - 1) as u64,
            used: 0,
            load_limit,
            next_limit: 0,
            hits: Cell::new(0),
            misses: Cell::new(0),
        };
        cache.update_next_limit();
        cache
    }

    /// Number of live entries.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Get the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits.get()
    }
    /// Get the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses.get()
    }

    /// Bytes held by the table.
    pub fn mem_bytes(&self) -> usize {
        self.data.capacity() * std::mem::size_of::<Option<Entry<K, V>>>()
    }

    /// Changes the growth trigger factor.
    pub fn set_load_limit(&mut self, load_limit: f64) {
        self.load_limit = load_limit;
        self.update_next_limit();
    }

    fn update_next_limit(&mut self) {
        self.next_limit = (self.data.len() as f64 * self.load_limit) as usize;
    }

    fn index(&self, key: u64) -> usize {
        (key & self.bitmask) as usize
    }

    /// Get the cached result.
    pub fn get(&self, key: &K) -> Option<V> {
        match &self.data[self.index(key.hash())] {
            Some(entry) if entry.key == *key => {
                self.hits.set(self.hits.get() + 1);
                Some(entry.value)
            }
            _ => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    /// Insert a result, growing the table first if it is overloaded.
    pub fn insert(&mut self, key: K, value: V) {
        if self.used > self.next_limit && self.data.len() < MAX_TABLE_SIZE {
            self.resize(self.data.len() * 2);
        }
        let index = self.index(key.hash());
        if self.data[index].is_none() {
            self.used += 1;
        }
        self.data[index] = Some(Entry { key, value });
    }

    fn resize(&mut self, new_size: usize) {
        debug!("cache resize: {} -> {}", self.data.len(), new_size);
        let old: Vec<Option<Entry<K, V>>> =
            std::mem::replace(&mut self.data, std::iter::repeat_with(|| None).take(new_size).collect());
        self.bitmask = (new_size - 1) as u64;
        self.used = 0;
        for entry in old.into_iter().flatten() {
            let index = self.index(entry.key.hash());
            if self.data[index].is_none() {
                self.used += 1;
            }
            self.data[index] = Some(entry);
        }
        self.update_next_limit();
    }

    /// Drops every entry the predicate rejects. Called during GC with a
    /// predicate that rejects entries touching unreferenced nodes.
    pub fn sweep(&mut self, mut keep: impl FnMut(&K, &V) -> bool) {
        for slot in self.data.iter_mut() {
            if let Some(entry) = slot {
                if !keep(&entry.key, &entry.value) {
                    *slot = None;
                    self.used -= 1;
                }
            }
        }
    }

    /// Reset the cache.
    pub fn clear(&mut self) {
        self.data.fill_with(|| None);
        self.used = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_basic() {
        let mut cache = Cache::<(u64, u64), i32>::new(3, 0.8);

        cache.insert((1, 2), 3);
        cache.insert((2, 3), 1);
        cache.insert((1, 3), 2);

        assert_eq!(cache.get(&(1, 2)), Some(3));
        assert_eq!(cache.get(&(2, 3)), Some(1));
        assert_eq!(cache.get(&(1, 3)), Some(2));
        assert_eq!(cache.get(&(2, 1)), None);
        assert_eq!(cache.get(&(1, 1)), None);
    }

    #[test]
    fn test_cache_grows_under_load() {
        let mut cache = Cache::<(u64, u64), i32>::new(2, 0.8);
        let before = cache.mem_bytes();

        // These keys hash to 0, 1, 2, 3: the 4-slot table fills completely,
        // so the next insert doubles it.
        cache.insert((0, 0), 10);
        cache.insert((0, 1), 11);
        cache.insert((1, 0), 12);
        cache.insert((1, 1), 13);
        assert_eq!(cache.used(), 4);
        cache.insert((1, 2), 14);
        assert!(cache.mem_bytes() > before);

        // Entries survive the rehash.
        assert_eq!(cache.get(&(0, 0)), Some(10));
        assert_eq!(cache.get(&(1, 1)), Some(13));
        assert_eq!(cache.get(&(1, 2)), Some(14));
    }

    #[test]
    fn test_cache_sweep() {
        let mut cache = Cache::<(u64, u64), i32>::new(4, 0.8);
        cache.insert((1, 2), 10);
        cache.insert((3, 4), 20);
        assert_eq!(cache.used(), 2);

        cache.sweep(|_, &v| v != 20);
        assert_eq!(cache.used(), 1);
        assert_eq!(cache.get(&(1, 2)), Some(10));
        assert_eq!(cache.get(&(3, 4)), None);
    }
}
