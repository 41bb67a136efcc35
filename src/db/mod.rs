mod cache;
pub mod eviction;
pub mod storage;

pub use cache::*;

/// Cache defines the operations a caller needs from a key-value cache.
/// Both calls take `&self` so a single instance can be shared between threads.
pub trait Cache<K, V> {
    /// get returns a copy of the value stored under `key`, or `None` on a miss.
    /// A hit counts as a use of the entry.
    fn get(&self, key: &K) -> Option<V>;

    /// put stores `value` under `key`, returning the value it replaced, if any.
    fn put(&self, key: K, value: V) -> Option<V>;
}

/// EntryHandle identifies the arena slot holding an entry of the recency list.
/// A handle is only meaningful for the list that issued it, and only while the entry is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(usize);

impl EntryHandle {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Entry represents a cache item together with its position in recency order.
/// Links are slot handles into the arena which owns every entry.
#[derive(Debug, Clone)]
pub struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    prev: Option<EntryHandle>,
    next: Option<EntryHandle>,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            prev: None,
            next: None,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    fn is_unlinked(&self) -> bool {
        self.prev.is_none() && self.next.is_none()
    }
}
