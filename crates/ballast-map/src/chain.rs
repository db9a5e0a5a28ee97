//! Separate chaining over an index-linked node pool.
//!
//! One contiguous pool holds every node; the first `capacity` entries
//! are the root slots (`root = hash mod capacity`) and are never freed —
//! a vacated root just reads `Empty`. Overflow nodes append to the pool
//! or come back off an intrusive free list threaded through `next`.
//! Links are `u32` indices with [`NIL`] as the null, so they survive
//! pool growth (the backing array doubles in place of reallocation-
//! per-node) and there are no pointers to dangle.
//!
//! Removing a root with a successor copies the successor's contents into
//! the root slot and recycles the successor node, keeping the root-per-
//! bucket invariant without a moving head pointer.

use std::mem::MaybeUninit;

use ballast_core::Allocator;

use crate::open::SlotState;
use crate::raw::RawArray;

/// Null link.
pub(crate) const NIL: u32 = u32::MAX;

/// One pool entry: chain links, cached hash, and state-gated payload.
///
/// `key` and `value` are initialised exactly while `state` is `Alive`;
/// the accessors below encode that contract.
pub(crate) struct Node<K, V> {
    state: SlotState,
    hash: u64,
    next: u32,
    prev: u32,
    key: MaybeUninit<K>,
    value: MaybeUninit<V>,
}

impl<K: Copy, V: Copy> Clone for Node<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: Copy, V: Copy> Copy for Node<K, V> {}

impl<K: Copy, V: Copy> Node<K, V> {
    fn empty() -> Self {
        Self {
            state: SlotState::Empty,
            hash: 0,
            next: NIL,
            prev: NIL,
            key: MaybeUninit::uninit(),
            value: MaybeUninit::uninit(),
        }
    }

    fn key(&self) -> &K {
        debug_assert_eq!(self.state, SlotState::Alive);
        // SAFETY: `Alive` nodes have initialised payloads; every caller
        // checks the state first.
        unsafe { self.key.assume_init_ref() }
    }

    fn value(&self) -> &V {
        debug_assert_eq!(self.state, SlotState::Alive);
        // SAFETY: as for `key`.
        unsafe { self.value.assume_init_ref() }
    }

    fn value_mut(&mut self) -> &mut V {
        debug_assert_eq!(self.state, SlotState::Alive);
        // SAFETY: as for `key`.
        unsafe { self.value.assume_init_mut() }
    }
}

/// Chained hash table over an index-linked node pool.
pub(crate) struct ChainTable<K, V> {
    nodes: RawArray<Node<K, V>>,
    /// Root slot count; fixed for the table's lifetime.
    capacity: u32,
    /// Initialised pool entries (roots plus appended overflow nodes).
    pool_len: u32,
    /// Head of the free list of recycled overflow nodes.
    free_head: u32,
    live: u32,
}

impl<K: Copy, V: Copy> ChainTable<K, V> {
    pub(crate) fn new<A: Allocator>(allocator: &mut A, capacity: u32) -> Self {
        let mut nodes = RawArray::new_uninit(allocator, capacity);
        for index in 0..capacity {
            nodes.write(index, Node::empty());
        }
        Self {
            nodes,
            capacity,
            pool_len: capacity,
            free_head: NIL,
            live: 0,
        }
    }

    pub(crate) fn release<A: Allocator>(&mut self, allocator: &mut A) {
        self.nodes.free(allocator);
        self.capacity = 0;
        self.pool_len = 0;
        self.free_head = NIL;
        self.live = 0;
    }

    pub(crate) fn len(&self) -> u32 {
        self.live
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    fn root_of(&self, hash: u64) -> u32 {
        (hash % u64::from(self.capacity)) as u32
    }

    /// Node holding a live `key`, if any.
    pub(crate) fn find(&self, key: &K, hash: u64, equal: fn(&K, &K) -> bool) -> Option<u32> {
        let mut current = self.root_of(hash);
        if self.nodes.ref_at(current).state == SlotState::Empty {
            return None;
        }
        loop {
            let node = self.nodes.ref_at(current);
            if node.state == SlotState::Alive && node.hash == hash && equal(key, node.key()) {
                return Some(current);
            }
            if node.next == NIL {
                return None;
            }
            current = node.next;
        }
    }

    pub(crate) fn key_at(&self, index: u32) -> &K {
        self.nodes.ref_at(index).key()
    }

    pub(crate) fn value_at(&self, index: u32) -> &V {
        self.nodes.ref_at(index).value()
    }

    pub(crate) fn value_at_mut(&mut self, index: u32) -> &mut V {
        self.nodes.mut_at(index).value_mut()
    }

    /// First root at or past `from` with a live chain. Drives iteration.
    pub(crate) fn first_alive_root(&self, from: u32) -> Option<u32> {
        (from..self.capacity).find(|&index| self.nodes.ref_at(index).state == SlotState::Alive)
    }

    /// Successor of `index` in its chain, or [`NIL`].
    pub(crate) fn next_in_chain(&self, index: u32) -> u32 {
        self.nodes.ref_at(index).next
    }

    /// Pop the free list or append to the pool, doubling it when full.
    /// The returned node is `empty()`.
    fn acquire_node<A: Allocator>(&mut self, allocator: &mut A) -> u32 {
        let index = if self.free_head != NIL {
            let index = self.free_head;
            self.free_head = self.nodes.ref_at(index).next;
            index
        } else {
            if self.pool_len == self.nodes.len() {
                self.grow_pool(allocator);
            }
            let index = self.pool_len;
            self.pool_len += 1;
            index
        };
        self.nodes.write(index, Node::empty());
        index
    }

    fn grow_pool<A: Allocator>(&mut self, allocator: &mut A) {
        let mut bigger = RawArray::new_uninit(allocator, self.nodes.len() * 2);
        self.nodes.copy_prefix_into(&mut bigger, self.pool_len);
        self.nodes.free(allocator);
        self.nodes = bigger;
    }

    /// Slot for a key known to be absent: the empty root, or a fresh
    /// tail node linked onto the chain.
    fn insert_slot<A: Allocator>(&mut self, allocator: &mut A, hash: u64) -> u32 {
        let root = self.root_of(hash);
        if self.nodes.ref_at(root).state == SlotState::Empty {
            return root;
        }
        let mut tail = root;
        while self.nodes.ref_at(tail).next != NIL {
            tail = self.nodes.ref_at(tail).next;
        }
        let index = self.acquire_node(allocator);
        self.nodes.mut_at(tail).next = index;
        self.nodes.mut_at(index).prev = tail;
        index
    }

    /// Commit key and value into a slot from [`insert_slot`], keeping
    /// its chain links.
    fn fill(&mut self, index: u32, hash: u64, key: K, value: V) {
        let node = self.nodes.mut_at(index);
        node.state = SlotState::Alive;
        node.hash = hash;
        node.key = MaybeUninit::new(key);
        node.value = MaybeUninit::new(value);
        self.live += 1;
    }

    fn recycle(&mut self, index: u32) {
        debug_assert!(index >= self.capacity, "root nodes are never recycled");
        let node = self.nodes.mut_at(index);
        node.state = SlotState::Empty;
        node.next = self.free_head;
        self.free_head = index;
    }

    /// Insert a fresh key; `false` (and no write) when it is already
    /// live.
    pub(crate) fn insert<A: Allocator>(
        &mut self,
        allocator: &mut A,
        key: K,
        value: V,
        hash: u64,
        equal: fn(&K, &K) -> bool,
    ) -> bool {
        if self.find(&key, hash, equal).is_some() {
            return false;
        }
        let index = self.insert_slot(allocator, hash);
        self.fill(index, hash, key, value);
        true
    }

    /// Write unconditionally; the prior value when the key was live.
    pub(crate) fn set<A: Allocator>(
        &mut self,
        allocator: &mut A,
        key: K,
        value: V,
        hash: u64,
        equal: fn(&K, &K) -> bool,
    ) -> Option<V> {
        if let Some(index) = self.find(&key, hash, equal) {
            let node = self.nodes.mut_at(index);
            let prior = *node.value();
            node.value = MaybeUninit::new(value);
            return Some(prior);
        }
        let index = self.insert_slot(allocator, hash);
        self.fill(index, hash, key, value);
        None
    }

    /// Unlink a live key; its value when it was present.
    ///
    /// A childless root reads `Empty` afterwards; a root with a
    /// successor takes over that successor's contents in place (so the
    /// root-slot invariant holds) and the successor recycles; interior
    /// nodes unlink and recycle.
    pub(crate) fn remove(&mut self, key: &K, hash: u64, equal: fn(&K, &K) -> bool) -> Option<V> {
        let index = self.find(key, hash, equal)?;
        let node = self.nodes.read(index);
        let removed = *node.value();

        if node.prev == NIL {
            if node.next == NIL {
                self.nodes.write(index, Node::empty());
            } else {
                let successor_index = node.next;
                let successor = self.nodes.read(successor_index);
                self.nodes.write(
                    index,
                    Node {
                        prev: NIL,
                        ..successor
                    },
                );
                if successor.next != NIL {
                    self.nodes.mut_at(successor.next).prev = index;
                }
                self.recycle(successor_index);
            }
        } else {
            self.nodes.mut_at(node.prev).next = node.next;
            if node.next != NIL {
                self.nodes.mut_at(node.next).prev = node.prev;
            }
            self.recycle(index);
        }

        self.live -= 1;
        Some(removed)
    }
}
