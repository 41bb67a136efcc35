// The cache is a single critical section: a get reorders entries, so reads need the lock as much
// as writes do. Every public call takes the mutex once and performs its whole
// index lookup + list edit before releasing it.

use crate::db::eviction::RecencyList;
use crate::db::storage::KeyIndex;
use crate::db::Cache;
use crate::error::CacheError;
use metrics::{counter, describe_counter};
use std::borrow::Borrow;
use std::fmt::{Debug, Formatter};
use std::hash::Hash;
use std::marker::PhantomData;
use std::mem;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, trace};

const METRIC_HITS: &str = "lru_cache_hits";
const METRIC_HITS_DESC: &str = "number of get calls which found their key";
const METRIC_MISSES: &str = "lru_cache_misses";
const METRIC_MISSES_DESC: &str = "number of get calls which did not find their key";
const METRIC_EVICTIONS: &str = "lru_cache_evictions";
const METRIC_EVICTIONS_DESC: &str = "number of entries evicted to make room for a new key";

/// State is the data guarded by the cache mutex.
/// The list and the index always hold exactly the same set of keys.
struct State<K, V> {
    list: RecencyList<K, V>,
    index: KeyIndex<K>,
}

/// LruCache is a fixed-capacity, thread-safe least-recently-used cache.
///
/// Lookups and inserts are O(1). Once `capacity` entries are stored, inserting a new key first
/// evicts the entry which was touched (by `get` or `put`) the longest time ago.
///
/// # Example
///
/// ```
/// use lrucache::LruCache;
///
/// let cache = LruCache::new(2).unwrap();
/// cache.put(1, "one");
/// cache.put(2, "two");
/// assert_eq!(cache.get(&1), Some("one"));
///
/// // 2 is now the least recently used key
/// cache.put(3, "three");
/// assert_eq!(cache.get(&2), None);
/// ```
pub struct LruCache<K, V> {
    capacity: usize,
    state: Mutex<State<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// new creates a cache holding at most `capacity` entries.
    /// A zero capacity is rejected with `CacheError::NoCapacity`.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::NoCapacity);
        }

        describe_counter!(METRIC_HITS, METRIC_HITS_DESC);
        describe_counter!(METRIC_MISSES, METRIC_MISSES_DESC);
        describe_counter!(METRIC_EVICTIONS, METRIC_EVICTIONS_DESC);
        debug!(capacity, "lru cache created");

        Ok(Self {
            capacity,
            state: Mutex::new(State {
                list: RecencyList::with_capacity(capacity),
                index: KeyIndex::with_capacity(capacity),
            }),
        })
    }

    // Nothing panics while the lock is held, so a poisoned mutex means a bug: ok to panic.
    fn lock(&self) -> MutexGuard<'_, State<K, V>> {
        self.state.lock().unwrap()
    }

    /// get returns a copy of the value stored under `key` and marks the entry as the most
    /// recently used. A miss returns `None` and leaves the cache untouched.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.lock();
        let Some(handle) = state.index.lookup(key) else {
            counter!(METRIC_MISSES).increment(1);
            return None;
        };
        state.list.move_to_front(handle);
        counter!(METRIC_HITS).increment(1);
        state.list.entry(handle).map(|entry| entry.value.clone())
    }

    /// put stores `value` under `key` and marks the entry as the most recently used.
    ///
    /// Overwriting an existing key returns the replaced value and never evicts. Inserting a new
    /// key into a full cache evicts the least recently used entry first.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let mut state = self.lock();

        if let Some(handle) = state.index.lookup(&key) {
            let previous = state
                .list
                .entry_mut(handle)
                .map(|entry| mem::replace(&mut entry.value, value));
            state.list.move_to_front(handle);
            return previous;
        }

        if state.index.len() >= self.capacity {
            Self::evict(&mut state);
        }
        let handle = state.list.insert_front(key.clone(), value);
        state.index.insert(key, handle);
        None
    }

    /// evict drops the least recently used entry from both structures.
    fn evict(state: &mut State<K, V>) {
        if let Some(entry) = state.list.pop_back() {
            state.index.remove(&entry.key);
            counter!(METRIC_EVICTIONS).increment(1);
            trace!(size = state.list.len(), "evicted least recently used entry");
        }
    }

    /// remove deletes `key` from the cache and returns its value, if it was present.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.lock();
        let handle = state.index.remove(key)?;
        state.list.unlink(handle);
        let entry = state.list.release(handle);
        debug!(size = state.list.len(), "entry removed on demand");
        Some(entry.value)
    }

    /// peek returns a copy of the value for `key` without touching its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let state = self.lock();
        let handle = state.index.lookup(key)?;
        state.list.entry(handle).map(|entry| entry.value.clone())
    }

    /// contains checks membership without touching recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().index.contains(key)
    }

    /// keys returns a snapshot of the stored keys, from the most to the least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.lock()
            .list
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// clear drops every entry. The capacity is kept.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.list.clear();
        state.index.clear();
        debug!("lru cache cleared");
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        let state = self.lock();
        assert!(state.index.len() <= self.capacity, "capacity exceeded");
        assert_eq!(state.list.len(), state.index.len(), "list and index disagree");
        assert_eq!(state.list.iter().count(), state.list.len(), "list links are torn");
        for entry in state.list.iter() {
            let handle = state.index.lookup(&entry.key).expect("orphaned list entry");
            assert!(std::ptr::eq(state.list.entry(handle).unwrap(), entry));
        }
    }
}

impl<K, V> Cache<K, V> for LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn get(&self, key: &K) -> Option<V> {
        LruCache::get(self, key)
    }

    fn put(&self, key: K, value: V) -> Option<V> {
        LruCache::put(self, key, value)
    }
}

impl<K, V> Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.state.try_lock() {
            Ok(state) => write!(
                f,
                "LruCache{{capacity: {}, len: {}}}",
                self.capacity,
                state.list.len()
            ),
            Err(_) => write!(f, "LruCache{{capacity: {}, len: <locked>}}", self.capacity),
        }
    }
}

/// CacheBuilder is a struct used to build a cache.
/// # Example
///
/// ```
/// use lrucache::CacheBuilder;
///
/// let cache = CacheBuilder::<String, u64>::new()
///     .with_capacity(1024)
///     .build()
///     .unwrap();
/// assert_eq!(cache.capacity(), 1024);
/// ```
pub struct CacheBuilder<K, V> {
    capacity: Option<usize>,
    _marker: PhantomData<(K, V)>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        CacheBuilder {
            capacity: None,
            _marker: PhantomData,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// build fails with `CacheError::NoCapacity` if no capacity, or a zero one, was given.
    pub fn build(self) -> Result<LruCache<K, V>, CacheError> {
        LruCache::new(self.capacity.ok_or(CacheError::NoCapacity)?)
    }
}

impl<K, V> Default for CacheBuilder<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        CacheBuilder::new()
    }
}
