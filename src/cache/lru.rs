//! Recency Index Module
//!
//! Orders live keys from most to least recently touched.

// == Constants ==
/// Null link in the arena.
const NIL: usize = usize::MAX;

// == Recency Handle ==
/// Position of a key inside a [`RecencyIndex`].
///
/// A handle is an arena slot plus the generation the slot had when the key
/// was linked. Once the key leaves the index the slot's generation moves on,
/// so a stale handle never resolves to another key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecencyHandle {
    slot: usize,
    generation: u64,
}

#[derive(Debug)]
struct Node<K> {
    key: Option<K>,
    prev: usize,
    next: usize,
    generation: u64,
}

// == Recency Index ==
/// Arena-backed doubly-linked list of keys.
///
/// - Front = Most recently used
/// - Back = Least recently used (next eviction victim)
///
/// Every operation is O(1); freed slots are recycled.
#[derive(Debug)]
pub struct RecencyIndex<K> {
    nodes: Vec<Node<K>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<K> Default for RecencyIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RecencyIndex<K> {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty index with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    // == Push Front ==
    /// Links `key` as the most recently used entry and returns its handle.
    ///
    /// The index does not deduplicate; callers keep one handle per live key.
    pub fn push_front(&mut self, key: K) -> RecencyHandle {
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot].key = Some(key);
                slot
            }
            None => {
                self.nodes.push(Node {
                    key: Some(key),
                    prev: NIL,
                    next: NIL,
                    generation: 0,
                });
                self.nodes.len() - 1
            }
        };

        self.link_front(slot);
        self.len += 1;

        RecencyHandle {
            slot,
            generation: self.nodes[slot].generation,
        }
    }

    // == Touch ==
    /// Moves the key behind `handle` to the front.
    ///
    /// Returns false if the handle is stale.
    pub fn touch(&mut self, handle: RecencyHandle) -> bool {
        let Some(slot) = self.resolve(handle) else {
            return false;
        };

        if self.head != slot {
            self.unlink(slot);
            self.link_front(slot);
        }
        true
    }

    // == Remove ==
    /// Unlinks the key behind `handle`, returning it if the handle was live.
    pub fn remove(&mut self, handle: RecencyHandle) -> Option<K> {
        let slot = self.resolve(handle)?;
        Some(self.release(slot))
    }

    // == Evict Oldest ==
    /// Returns and unlinks the least recently used key.
    ///
    /// Returns None if the index is empty.
    pub fn evict_oldest(&mut self) -> Option<(K, RecencyHandle)> {
        if self.tail == NIL {
            return None;
        }

        let slot = self.tail;
        let handle = RecencyHandle {
            slot,
            generation: self.nodes[slot].generation,
        };
        Some((self.release(slot), handle))
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.nodes.get(self.tail).and_then(|node| node.key.as_ref())
    }

    // == Contains ==
    /// Checks whether `handle` still points at a linked key.
    pub fn contains(&self, handle: RecencyHandle) -> bool {
        self.resolve(handle).is_some()
    }

    // == Length ==
    /// Returns the number of linked keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates keys from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            index: self,
            cursor: self.head,
        }
    }

    fn resolve(&self, handle: RecencyHandle) -> Option<usize> {
        self.nodes
            .get(handle.slot)
            .filter(|node| node.generation == handle.generation && node.key.is_some())
            .map(|_| handle.slot)
    }

    fn release(&mut self, slot: usize) -> K {
        self.unlink(slot);
        self.len -= 1;

        let node = &mut self.nodes[slot];
        node.generation = node.generation.wrapping_add(1);
        self.free.push(slot);

        // Only linked slots reach here, and linked slots always hold a key.
        match node.key.take() {
            Some(key) => key,
            None => unreachable!("linked recency slot without a key"),
        }
    }

    fn link_front(&mut self, slot: usize) {
        self.nodes[slot].prev = NIL;
        self.nodes[slot].next = self.head;

        if self.head != NIL {
            self.nodes[self.head].prev = slot;
        } else {
            self.tail = slot;
        }
        self.head = slot;
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);

        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }

        self.nodes[slot].prev = NIL;
        self.nodes[slot].next = NIL;
    }
}

/// Front-to-back iterator over a [`RecencyIndex`].
pub struct Iter<'a, K> {
    index: &'a RecencyIndex<K>,
    cursor: usize,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.index.nodes.get(self.cursor)?;
        self.cursor = node.next;
        node.key.as_ref()
    }
}
