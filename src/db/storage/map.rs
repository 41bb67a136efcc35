use crate::db::EntryHandle;
use rustc_hash::FxHashMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// KeyIndex resolves a key to the handle of its entry in the recency list.
/// It is backed by an FxHashMap, so lookups do not scan anything.
#[derive(Debug)]
pub struct KeyIndex<K> {
    data: FxHashMap<K, EntryHandle>,
}

impl<K: Hash + Eq> KeyIndex<K> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// lookup returns the handle registered for `key`. Absence is a normal outcome.
    pub fn lookup<Q>(&self, key: &Q) -> Option<EntryHandle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.data.get(key).copied()
    }

    /// insert registers `key`.
    ///
    /// # Panics
    ///
    /// Registering a key which already points to another entry is a bug in the caller:
    /// the old mapping must be removed first.
    pub fn insert(&mut self, key: K, handle: EntryHandle) {
        let previous = self.data.insert(key, handle);
        assert!(
            previous.is_none() || previous == Some(handle),
            "key is already registered to another entry"
        );
    }

    /// remove deletes the mapping for `key`, returning the handle it pointed to.
    /// Removing an absent key is a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<EntryHandle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.data.remove(key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl<K: Hash + Eq> Default for KeyIndex<K> {
    fn default() -> Self {
        KeyIndex::new()
    }
}
