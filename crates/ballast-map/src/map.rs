//! The hash map surface.
//!
//! [`HashMap`] dispatches every operation over the strategy picked at
//! construction: open addressing (`open`) or separate chaining
//! (`chain`). Keys and values are plain-copy data; the map
//! stores them by value in tables carved from its descriptor's
//! allocator, and owns those bytes (not the allocator) for its lifetime.

use ballast_core::Allocator;

use crate::chain::{ChainTable, NIL};
use crate::desc::{CollisionResolution, MapDesc};
use crate::error::MapError;
use crate::open::OpenTable;

enum Storage<K, V> {
    Open(OpenTable<K, V>),
    Chain(ChainTable<K, V>),
}

/// Key→value associative container over a pluggable allocator.
///
/// Built from a [`MapDesc`]; see the crate docs for a quick start. Open
/// addressing grows (doubles and rehashes) when three quarters of its
/// slots are occupied; a chained map keeps its root count and grows
/// per-bucket chains instead.
///
/// References from [`get_ref`](HashMap::get_ref) and
/// [`get_mut`](HashMap::get_mut) borrow the map, so the borrow checker
/// rejects holding one across a mutating call — mutation may move or
/// overwrite entry storage (chained removal copies a successor into the
/// root slot, growth rehashes everything).
pub struct HashMap<K: Copy, V: Copy, A: Allocator = ballast_core::SystemAllocator> {
    allocator: A,
    hash_fn: fn(&K) -> u64,
    equal_fn: fn(&K, &K) -> bool,
    storage: Storage<K, V>,
}

impl<K: Copy, V: Copy, A: Allocator> core::fmt::Debug for HashMap<K, V, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashMap")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<K: Copy, V: Copy, A: Allocator> HashMap<K, V, A> {
    /// Build a map from `desc`.
    ///
    /// Fails when the capacity is zero or not a power of two, or when
    /// the key or value alignment exceeds what the allocator guarantees.
    pub fn new(desc: MapDesc<K, V, A>) -> Result<Self, MapError> {
        validate::<K, V>(desc.capacity)?;
        let mut allocator = desc.allocator;
        let storage = match desc.resolution {
            CollisionResolution::OpenAddressing => {
                Storage::Open(OpenTable::new(&mut allocator, desc.capacity))
            }
            CollisionResolution::Chaining => {
                Storage::Chain(ChainTable::new(&mut allocator, desc.capacity))
            }
        };
        Ok(Self {
            allocator,
            hash_fn: desc.hash_fn,
            equal_fn: desc.equal_fn,
            storage,
        })
    }

    fn hash(&self, key: &K) -> u64 {
        (self.hash_fn)(key)
    }

    /// Insert a fresh key. Returns `false` without touching the stored
    /// value when the key is already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let hash = self.hash(&key);
        match &mut self.storage {
            Storage::Open(table) => {
                table.insert(&mut self.allocator, key, value, hash, self.equal_fn)
            }
            Storage::Chain(table) => {
                table.insert(&mut self.allocator, key, value, hash, self.equal_fn)
            }
        }
    }

    /// Write unconditionally. Returns the prior value on overwrite,
    /// `None` when the key was new.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash(&key);
        match &mut self.storage {
            Storage::Open(table) => table.set(&mut self.allocator, key, value, hash, self.equal_fn),
            Storage::Chain(table) => {
                table.set(&mut self.allocator, key, value, hash, self.equal_fn)
            }
        }
    }

    /// Copy out the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_ref(key).copied()
    }

    /// Borrow the value stored under `key`.
    pub fn get_ref(&self, key: &K) -> Option<&V> {
        let hash = self.hash(key);
        match &self.storage {
            Storage::Open(table) => table
                .find(key, hash, self.equal_fn)
                .map(|index| table.value_at(index)),
            Storage::Chain(table) => table
                .find(key, hash, self.equal_fn)
                .map(|index| table.value_at(index)),
        }
    }

    /// Mutably borrow the value stored under `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash(key);
        match &mut self.storage {
            Storage::Open(table) => table
                .find(key, hash, self.equal_fn)
                .map(|index| table.value_at_mut(index)),
            Storage::Chain(table) => table
                .find(key, hash, self.equal_fn)
                .map(|index| table.value_at_mut(index)),
        }
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get_ref(key).is_some()
    }

    /// Remove `key`, returning its value when it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = self.hash(key);
        match &mut self.storage {
            Storage::Open(table) => table.remove(key, hash, self.equal_fn),
            Storage::Chain(table) => table.remove(key, hash, self.equal_fn),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Open(table) => table.len() as usize,
            Storage::Chain(table) => table.len() as usize,
        }
    }

    /// Whether the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current root slot count. Grows for open addressing, fixed for
    /// chaining.
    pub fn capacity(&self) -> u32 {
        match &self.storage {
            Storage::Open(table) => table.capacity(),
            Storage::Chain(table) => table.capacity(),
        }
    }

    /// Visit every live entry exactly once, in table order.
    ///
    /// The order is implementation-defined and changes across inserts,
    /// removals and growth; tests must not assume insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        match &self.storage {
            Storage::Open(table) => Iter {
                state: IterState::Open {
                    table,
                    index: 0,
                },
            },
            Storage::Chain(table) => {
                let root = table.first_alive_root(0);
                Iter {
                    state: IterState::Chain {
                        table,
                        root,
                        node: root.map_or(NIL, |index| index),
                    },
                }
            }
        }
    }
}

impl<K: Copy, V: Copy, A: Allocator> Drop for HashMap<K, V, A> {
    fn drop(&mut self) {
        match &mut self.storage {
            Storage::Open(table) => table.release(&mut self.allocator),
            Storage::Chain(table) => table.release(&mut self.allocator),
        }
    }
}

fn validate<K, V>(capacity: u32) -> Result<(), MapError> {
    if capacity == 0 || !capacity.is_power_of_two() {
        return Err(MapError::InvalidDescriptor {
            reason: format!("capacity must be a nonzero power of two (got {capacity})"),
        });
    }
    if std::mem::align_of::<K>() > ballast_core::MIN_ALIGN {
        return Err(MapError::InvalidDescriptor {
            reason: format!(
                "key alignment ({}) exceeds the allocator guarantee ({})",
                std::mem::align_of::<K>(),
                ballast_core::MIN_ALIGN
            ),
        });
    }
    if std::mem::align_of::<V>() > ballast_core::MIN_ALIGN {
        return Err(MapError::InvalidDescriptor {
            reason: format!(
                "value alignment ({}) exceeds the allocator guarantee ({})",
                std::mem::align_of::<V>(),
                ballast_core::MIN_ALIGN
            ),
        });
    }
    Ok(())
}

enum IterState<'a, K: Copy, V: Copy> {
    Open {
        table: &'a OpenTable<K, V>,
        index: u32,
    },
    Chain {
        table: &'a ChainTable<K, V>,
        root: Option<u32>,
        node: u32,
    },
}

/// Iterator over a map's live entries. See [`HashMap::iter`].
pub struct Iter<'a, K: Copy, V: Copy> {
    state: IterState<'a, K, V>,
}

impl<'a, K: Copy, V: Copy> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.state {
            IterState::Open { table, index } => {
                while *index < table.capacity() {
                    let current = *index;
                    *index += 1;
                    if table.alive(current) {
                        return Some((table.key_at(current), table.value_at(current)));
                    }
                }
                None
            }
            IterState::Chain { table, root, node } => {
                let current_root = (*root)?;
                let current = *node;
                // Advance: down the chain first, then to the next root.
                let successor = table.next_in_chain(current);
                if successor != NIL {
                    *node = successor;
                } else {
                    *root = table.first_alive_root(current_root + 1);
                    *node = root.map_or(NIL, |index| index);
                }
                Some((table.key_at(current), table.value_at(current)))
            }
        }
    }
}
