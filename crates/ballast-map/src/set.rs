//! Hash set facade.
//!
//! A set is a map whose value type is `()`: the zero-sized value column
//! allocates nothing, so [`HashSet`] costs exactly the key storage of
//! the equivalent [`HashMap`](crate::HashMap) and shares all of its
//! collision-resolution behavior.

use ballast_core::Allocator;

use crate::desc::SetDesc;
use crate::error::MapError;
use crate::map::{HashMap, Iter};

/// Key-membership container over a pluggable allocator.
pub struct HashSet<K: Copy, A: Allocator = ballast_core::SystemAllocator> {
    map: HashMap<K, (), A>,
}

impl<K: Copy, A: Allocator> HashSet<K, A> {
    /// Build a set from `desc`. Validation rules match
    /// [`HashMap::new`].
    pub fn new(desc: SetDesc<K, A>) -> Result<Self, MapError> {
        Ok(Self {
            map: HashMap::new(desc.into_map_desc())?,
        })
    }

    /// Insert `key`. Returns `false` when it is already present.
    pub fn insert(&mut self, key: K) -> bool {
        self.map.insert(key, ())
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Remove `key`, reporting whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.map.remove(key).is_some()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the set holds no members.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Current root slot count.
    pub fn capacity(&self) -> u32 {
        self.map.capacity()
    }

    /// Visit every member exactly once, in table order.
    pub fn iter(&self) -> SetIter<'_, K> {
        SetIter {
            inner: self.map.iter(),
        }
    }
}

/// Iterator over a set's members. See [`HashSet::iter`].
pub struct SetIter<'a, K: Copy> {
    inner: Iter<'a, K, ()>,
}

impl<'a, K: Copy> Iterator for SetIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}
