//! Container descriptors.
//!
//! A descriptor names everything a container needs before it touches
//! memory: where bytes come from, how many root slots to start with, how
//! keys hash and compare, and which collision-resolution strategy backs
//! the table. Validation happens at construction
//! ([`HashMap::new`](crate::HashMap::new)), not here.

use ballast_core::SystemAllocator;

/// How a table resolves keys that hash to the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionResolution {
    /// All entries live in flat parallel arrays; collisions probe
    /// alternate slots quadratically and removals leave tombstones. The
    /// table doubles when three quarters of it is occupied.
    #[default]
    OpenAddressing,
    /// Each root slot owns a chain of entries threaded through a node
    /// pool by index. The root count is fixed; chains grow per bucket and
    /// removed overflow nodes recycle through a free list.
    Chaining,
}

/// Descriptor for [`HashMap::new`](crate::HashMap::new).
///
/// Construct with [`MapDesc::new`] and override the allocator or
/// resolution with the builder methods. `capacity` is the starting root
/// slot count and must be a nonzero power of two — the quadratic probe
/// sequence covers every slot only for power-of-two tables.
pub struct MapDesc<K, V, A = SystemAllocator> {
    /// Source of every table and node allocation. The map owns the bytes
    /// it gets, not the allocator itself.
    pub allocator: A,
    /// Starting slot count; a nonzero power of two.
    pub capacity: u32,
    /// Collision-resolution strategy.
    pub resolution: CollisionResolution,
    /// Key hash function. Equal keys must hash equally.
    pub hash_fn: fn(&K) -> u64,
    /// Key equality. Authoritative on hash collisions: equal hashes with
    /// unequal keys stay distinct entries.
    pub equal_fn: fn(&K, &K) -> bool,
    _value: std::marker::PhantomData<fn() -> V>,
}

impl<K, V> MapDesc<K, V, SystemAllocator> {
    /// Descriptor on the process heap with open addressing.
    pub fn new(capacity: u32, hash_fn: fn(&K) -> u64, equal_fn: fn(&K, &K) -> bool) -> Self {
        Self {
            allocator: SystemAllocator,
            capacity,
            resolution: CollisionResolution::OpenAddressing,
            hash_fn,
            equal_fn,
            _value: std::marker::PhantomData,
        }
    }
}

impl<K, V, A> MapDesc<K, V, A> {
    /// Same descriptor backed by a different allocator.
    pub fn with_allocator<B>(self, allocator: B) -> MapDesc<K, V, B> {
        MapDesc {
            allocator,
            capacity: self.capacity,
            resolution: self.resolution,
            hash_fn: self.hash_fn,
            equal_fn: self.equal_fn,
            _value: std::marker::PhantomData,
        }
    }

    /// Same descriptor under a different collision-resolution strategy.
    pub fn with_resolution(mut self, resolution: CollisionResolution) -> Self {
        self.resolution = resolution;
        self
    }
}

/// Descriptor for [`HashSet::new`](crate::HashSet::new): a [`MapDesc`]
/// without the value type.
pub struct SetDesc<K, A = SystemAllocator> {
    /// Source of every table and node allocation.
    pub allocator: A,
    /// Starting slot count; a nonzero power of two.
    pub capacity: u32,
    /// Collision-resolution strategy.
    pub resolution: CollisionResolution,
    /// Key hash function. Equal keys must hash equally.
    pub hash_fn: fn(&K) -> u64,
    /// Key equality.
    pub equal_fn: fn(&K, &K) -> bool,
}

impl<K> SetDesc<K, SystemAllocator> {
    /// Descriptor on the process heap with open addressing.
    pub fn new(capacity: u32, hash_fn: fn(&K) -> u64, equal_fn: fn(&K, &K) -> bool) -> Self {
        Self {
            allocator: SystemAllocator,
            capacity,
            resolution: CollisionResolution::OpenAddressing,
            hash_fn,
            equal_fn,
        }
    }
}

impl<K, A> SetDesc<K, A> {
    /// Same descriptor backed by a different allocator.
    pub fn with_allocator<B>(self, allocator: B) -> SetDesc<K, B> {
        SetDesc {
            allocator,
            capacity: self.capacity,
            resolution: self.resolution,
            hash_fn: self.hash_fn,
            equal_fn: self.equal_fn,
        }
    }

    /// Same descriptor under a different collision-resolution strategy.
    pub fn with_resolution(mut self, resolution: CollisionResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub(crate) fn into_map_desc(self) -> MapDesc<K, (), A> {
        MapDesc {
            allocator: self.allocator,
            capacity: self.capacity,
            resolution: self.resolution,
            hash_fn: self.hash_fn,
            equal_fn: self.equal_fn,
            _value: std::marker::PhantomData,
        }
    }
}
