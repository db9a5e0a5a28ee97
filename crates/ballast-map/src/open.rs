//! Open addressing with quadratic probing.
//!
//! Entries live in four parallel arrays (slot states, cached hashes,
//! keys, values). A colliding key probes the triangular quadratic
//! sequence `slot(h, i) = (h + (i + i²)/2) mod m`, which visits every
//! slot exactly once when `m` is a power of two — the descriptor
//! enforces power-of-two capacities for exactly this reason.
//!
//! Removal leaves a tombstone: the slot reads as `Dead` so probe chains
//! that ran through it keep finding their keys, and insert treats it as
//! writable. Tombstones count toward the 3/4 occupancy threshold and are
//! dropped at the next growth, when only live entries rehash into the
//! doubled table.

use ballast_core::Allocator;

use crate::raw::RawArray;

/// State of one slot or chain node. The zero pattern is `Empty`, so
/// zero-filled state arrays start out valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum SlotState {
    /// Never held a key; terminates probe sequences.
    Empty = 0,
    /// Holds a live key.
    Alive = 1,
    /// Tombstone: vacated, but probe sequences pass through.
    Dead = 2,
}

/// Probe offset for attempt `i`: the triangular number `(i + i²) / 2`.
fn triangle(i: u32) -> u64 {
    let i = u64::from(i);
    (i + i * i) / 2
}

fn slot_for(hash: u64, attempt: u32, capacity: u32) -> u32 {
    (hash.wrapping_add(triangle(attempt)) % u64::from(capacity)) as u32
}

/// First `Empty` slot on `hash`'s probe sequence in a table that holds
/// no tombstones. Used during rehash, where every key is distinct and
/// the target table is fresh.
fn probe_empty(states: &RawArray<SlotState>, hash: u64, capacity: u32) -> u32 {
    for attempt in 0..capacity {
        let index = slot_for(hash, attempt, capacity);
        if states.read(index) == SlotState::Empty {
            return index;
        }
    }
    unreachable!("rehash target table has free slots by construction");
}

/// Parallel-array hash table with quadratic probing.
///
/// Key and value slots are initialised only while their state is
/// `Alive` or `Dead`; every read of those arrays is gated on the state.
pub(crate) struct OpenTable<K, V> {
    states: RawArray<SlotState>,
    hashes: RawArray<u64>,
    keys: RawArray<K>,
    values: RawArray<V>,
    capacity: u32,
    /// Live entries.
    live: u32,
    /// Live entries plus tombstones; drives the growth threshold.
    occupied: u32,
}

impl<K: Copy, V: Copy> OpenTable<K, V> {
    pub(crate) fn new<A: Allocator>(allocator: &mut A, capacity: u32) -> Self {
        Self {
            states: RawArray::new_zeroed(allocator, capacity),
            hashes: RawArray::new_uninit(allocator, capacity),
            keys: RawArray::new_uninit(allocator, capacity),
            values: RawArray::new_uninit(allocator, capacity),
            capacity,
            live: 0,
            occupied: 0,
        }
    }

    pub(crate) fn release<A: Allocator>(&mut self, allocator: &mut A) {
        self.states.free(allocator);
        self.hashes.free(allocator);
        self.keys.free(allocator);
        self.values.free(allocator);
        self.capacity = 0;
        self.live = 0;
        self.occupied = 0;
    }

    pub(crate) fn len(&self) -> u32 {
        self.live
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Probe for `key`. Returns the first slot that ends the search: a
    /// live match, an `Empty` slot, or (when `accept_dead`) the first
    /// tombstone. `None` when every slot was probed without terminating —
    /// possible only in a table saturated with tombstones and matches
    /// nothing.
    fn probe(&self, key: &K, hash: u64, accept_dead: bool, equal: fn(&K, &K) -> bool) -> Option<u32> {
        for attempt in 0..self.capacity {
            let index = slot_for(hash, attempt, self.capacity);
            match self.states.read(index) {
                SlotState::Empty => return Some(index),
                SlotState::Dead if accept_dead => return Some(index),
                SlotState::Alive
                    if self.hashes.read(index) == hash && equal(key, self.keys.ref_at(index)) =>
                {
                    return Some(index)
                }
                _ => {}
            }
        }
        None
    }

    /// Slot holding a live `key`, if any.
    pub(crate) fn find(&self, key: &K, hash: u64, equal: fn(&K, &K) -> bool) -> Option<u32> {
        let index = self.probe(key, hash, false, equal)?;
        (self.states.read(index) == SlotState::Alive).then_some(index)
    }

    pub(crate) fn key_at(&self, index: u32) -> &K {
        debug_assert_eq!(self.states.read(index), SlotState::Alive);
        self.keys.ref_at(index)
    }

    pub(crate) fn value_at(&self, index: u32) -> &V {
        debug_assert_eq!(self.states.read(index), SlotState::Alive);
        self.values.ref_at(index)
    }

    pub(crate) fn value_at_mut(&mut self, index: u32) -> &mut V {
        debug_assert_eq!(self.states.read(index), SlotState::Alive);
        self.values.mut_at(index)
    }

    /// Whether slot `index` holds a live entry. Drives iteration.
    pub(crate) fn alive(&self, index: u32) -> bool {
        self.states.read(index) == SlotState::Alive
    }

    /// Write a fresh entry into a non-`Alive` slot.
    fn place(&mut self, index: u32, hash: u64, key: K, value: V) {
        let prior = self.states.read(index);
        debug_assert_ne!(prior, SlotState::Alive);
        if prior == SlotState::Empty {
            self.occupied += 1;
        }
        self.live += 1;
        self.states.write(index, SlotState::Alive);
        self.hashes.write(index, hash);
        self.keys.write(index, key);
        self.values.write(index, value);
    }

    /// Grow when one more occupied slot would push past 3/4 occupancy.
    fn grow_if_needed<A: Allocator>(&mut self, allocator: &mut A) {
        if u64::from(self.occupied + 1) * 4 > u64::from(self.capacity) * 3 {
            self.grow(allocator);
        }
    }

    /// Double the table, rehashing live entries and dropping tombstones.
    fn grow<A: Allocator>(&mut self, allocator: &mut A) {
        let new_capacity = self.capacity * 2;
        let mut states = RawArray::new_zeroed(allocator, new_capacity);
        let mut hashes = RawArray::new_uninit(allocator, new_capacity);
        let mut keys: RawArray<K> = RawArray::new_uninit(allocator, new_capacity);
        let mut values: RawArray<V> = RawArray::new_uninit(allocator, new_capacity);

        for index in 0..self.capacity {
            if self.states.read(index) != SlotState::Alive {
                continue;
            }
            let hash = self.hashes.read(index);
            let target = probe_empty(&states, hash, new_capacity);
            states.write(target, SlotState::Alive);
            hashes.write(target, hash);
            keys.write(target, self.keys.read(index));
            values.write(target, self.values.read(index));
        }

        self.release_arrays(allocator);
        self.states = states;
        self.hashes = hashes;
        self.keys = keys;
        self.values = values;
        self.capacity = new_capacity;
        self.occupied = self.live;
    }

    fn release_arrays<A: Allocator>(&mut self, allocator: &mut A) {
        self.states.free(allocator);
        self.hashes.free(allocator);
        self.keys.free(allocator);
        self.values.free(allocator);
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
        self.grow_if_needed(allocator);
        let index = self
            .probe(&key, hash, true, equal)
            .expect("a post-growth table has writable slots");
        self.place(index, hash, key, value);
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
            let prior = self.values.read(index);
            self.values.write(index, value);
            return Some(prior);
        }
        self.grow_if_needed(allocator);
        let index = self
            .probe(&key, hash, true, equal)
            .expect("a post-growth table has writable slots");
        self.place(index, hash, key, value);
        None
    }

    /// Tombstone a live key; its value when it was present.
    pub(crate) fn remove(&mut self, key: &K, hash: u64, equal: fn(&K, &K) -> bool) -> Option<V> {
        let index = self.find(key, hash, equal)?;
        self.states.write(index, SlotState::Dead);
        self.live -= 1;
        Some(self.values.read(index))
    }
}
