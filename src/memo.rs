//! Opt-in memoization for aggregate results.
//!
//! A `Memo` is owned by the caller and keyed by the archive `Snapshot` plus an argument
//! key. Any merge changes the snapshot, which empties the table on next use, so a result
//! computed before a merge is never returned after it.

use crate::archive::{ArchiveStore, Snapshot};
use ahash::AHashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

pub struct Memo<K, V> {
    snapshot: Option<Snapshot>,
    entries: AHashMap<K, V>,
    hits: u64,
    misses: u64,
}

impl<K: Eq + Hash, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self { snapshot: None, entries: AHashMap::new(), hits: 0, misses: 0 }
    }
}

impl<K: Eq + Hash, V> Memo<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key` at the store's current snapshot, computing it with
    /// `compute` on a miss.
    pub fn get_or_compute<F>(&mut self, store: &ArchiveStore, key: K, compute: F) -> &V
    where
        F: FnOnce(&ArchiveStore) -> V,
    {
        let snap = store.snapshot();
        if self.snapshot != Some(snap) {
            self.entries.clear();
            self.snapshot = Some(snap);
        }
        match self.entries.entry(key) {
            Entry::Occupied(e) => {
                self.hits += 1;
                e.into_mut()
            }
            Entry::Vacant(e) => {
                self.misses += 1;
                e.insert(compute(store))
            }
        }
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.snapshot = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
