use crate::db::{Entry, EntryHandle};

/// RecencyList keeps entries ordered from most recently used (front) to least recently used (back).
///
/// Entries live in a flat arena of slots. The `prev`/`next` links stored in each entry are slot
/// handles, so moving an entry around only rewrites a few indices and never walks the list.
/// Freed slots are recycled by later inserts, which keeps the arena at most as large as the
/// highest number of entries alive at once.
#[derive(Debug)]
pub struct RecencyList<K, V> {
    slots: Vec<Option<Entry<K, V>>>,
    // indices of empty slots, reused before the arena grows
    free: Vec<usize>,
    head: Option<EntryHandle>,
    tail: Option<EntryHandle>,
    // number of linked entries
    len: usize,
}

impl<K, V> RecencyList<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// with_capacity pre-allocates room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// front returns the most recently used entry.
    pub fn front(&self) -> Option<EntryHandle> {
        self.head
    }

    /// back returns the least recently used entry, the next one to evict.
    pub fn back(&self) -> Option<EntryHandle> {
        self.tail
    }

    pub fn entry(&self, handle: EntryHandle) -> Option<&Entry<K, V>> {
        self.slots.get(handle.index())?.as_ref()
    }

    pub fn entry_mut(&mut self, handle: EntryHandle) -> Option<&mut Entry<K, V>> {
        self.slots.get_mut(handle.index())?.as_mut()
    }

    /// insert_front stores a new entry in the arena and links it at the front.
    pub fn insert_front(&mut self, key: K, value: V) -> EntryHandle {
        let entry = Some(Entry::new(key, value));
        let handle = match self.free.pop() {
            Some(index) => {
                self.slots[index] = entry;
                EntryHandle(index)
            }
            None => {
                self.slots.push(entry);
                EntryHandle(self.slots.len() - 1)
            }
        };
        self.push_front(handle);
        handle
    }

    /// push_front links an unlinked entry at the front, making it the most recently used.
    pub fn push_front(&mut self, handle: EntryHandle) {
        debug_assert!(
            self.head != Some(handle) && self.node(handle).is_unlinked(),
            "entry is already linked"
        );
        let old_head = self.head;
        self.node_mut(handle).next = old_head;
        match old_head {
            Some(old_head) => self.node_mut(old_head).prev = Some(handle),
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
        self.len += 1;
    }

    /// unlink detaches an entry from wherever it sits and reconnects its neighbours.
    /// The entry stays in the arena with cleared links, ready to be pushed again or released.
    pub fn unlink(&mut self, handle: EntryHandle) {
        let entry = self.node_mut(handle);
        let (prev, next) = (entry.prev.take(), entry.next.take());
        debug_assert!(
            prev.is_some() || self.head == Some(handle),
            "entry is not linked"
        );

        match prev {
            Some(prev_handle) => self.node_mut(prev_handle).next = next,
            None => self.head = next,
        }
        match next {
            Some(next_handle) => self.node_mut(next_handle).prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// move_to_front marks a linked entry as the most recently used.
    pub fn move_to_front(&mut self, handle: EntryHandle) {
        if self.head == Some(handle) {
            return;
        }
        self.unlink(handle);
        self.push_front(handle);
    }

    /// release takes an unlinked entry out of the arena and frees its slot.
    pub fn release(&mut self, handle: EntryHandle) -> Entry<K, V> {
        debug_assert!(self.head != Some(handle), "releasing a linked entry");
        let entry = self.slots[handle.index()]
            .take()
            .expect("released entry handle points to an empty slot");
        self.free.push(handle.index());
        entry
    }

    /// pop_back unlinks and releases the least recently used entry.
    pub fn pop_back(&mut self) -> Option<Entry<K, V>> {
        let handle = self.tail?;
        self.unlink(handle);
        Some(self.release(handle))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// iter walks the entries from the most to the least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            next: self.head,
        }
    }

    // A handle held by the list itself always points to a live slot; anything else is a bug.
    fn node(&self, handle: EntryHandle) -> &Entry<K, V> {
        self.entry(handle).expect("dangling entry handle")
    }

    fn node_mut(&mut self, handle: EntryHandle) -> &mut Entry<K, V> {
        self.entry_mut(handle).expect("dangling entry handle")
    }
}

impl<K, V> Default for RecencyList<K, V> {
    fn default() -> Self {
        RecencyList::new()
    }
}

pub struct Iter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    next: Option<EntryHandle>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.list.entry(self.next?)?;
        self.next = entry.next;
        Some(entry)
    }
}
