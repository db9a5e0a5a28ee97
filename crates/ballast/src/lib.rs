//! Ballast: arena allocation, scratch pools, and allocator-agnostic hash
//! containers.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all ballast sub-crates. For most users, adding `ballast` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use ballast::prelude::*;
//!
//! // An arena for bulk allocation: positions are savepoints.
//! let mut arena = Arena::new(ArenaConfig::new())?;
//! let checkpoint = arena.pos();
//! let _buffer = arena.push(4096); // zeroed, 8-byte aligned
//! arena.pop_to(checkpoint);
//!
//! // A hash map carving its tables out of that arena.
//! let shared = arena.into_shared();
//! let desc = MapDesc::new(8, ballast::map::helpers::hash_str, ballast::map::helpers::equal)
//!     .with_allocator(shared.clone());
//! let mut ages: HashMap<&str, u32, _> = HashMap::new(desc)?;
//! ages.insert("ada", 36);
//! assert_eq!(ages.get(&"ada"), Some(36));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for items not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`core`] | `ballast-core` | `Allocator` trait, system allocator, FNV-1a |
//! | [`arena`] | `ballast-arena` | arenas, temp regions, scratch pool, metrics |
//! | [`map`] | `ballast-map` | hash map/set, descriptors, key helpers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Allocator capability trait and hashing primitives (`ballast-core`).
///
/// The [`core::Allocator`] trait is the seam between the arena and the
/// containers; [`core::SystemAllocator`] is the default heap backing.
pub use ballast_core as core;

/// Arena allocation (`ballast-arena`).
///
/// [`arena::Arena`] with chaining and virtual-memory modes,
/// [`arena::Temp`] savepoint guards, the thread-local scratch pool
/// ([`arena::scratch_begin`]), and the per-arena metrics registry.
pub use ballast_arena as arena;

/// Hash containers (`ballast-map`).
///
/// [`map::HashMap`] and [`map::HashSet`] over any allocator, with open
/// addressing or separate chaining, plus the [`map::helpers`] hash and
/// equality functions for descriptor slots.
pub use ballast_map as map;

/// Common imports for typical ballast usage.
///
/// ```rust
/// use ballast::prelude::*;
/// ```
pub mod prelude {
    // Allocation seam
    pub use ballast_core::{Allocator, SystemAllocator};

    // Arenas
    pub use ballast_arena::{
        scratch_begin, thread_ctx_init, thread_ctx_release, Arena, ArenaConfig, Scratch,
        SharedArena, Temp,
    };

    // Containers
    pub use ballast_map::{CollisionResolution, HashMap, HashSet, MapDesc, SetDesc};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn facade_wires_the_crates_together() {
        let mut arena = Arena::new(ArenaConfig {
            block_size: 64 * 1024,
            ..ArenaConfig::new()
        })
        .unwrap();
        let checkpoint = arena.pos();
        arena.push(512);
        arena.pop_to(checkpoint);

        let desc = MapDesc::new(
            8,
            ballast_map::helpers::hash_pod,
            ballast_map::helpers::equal,
        )
        .with_allocator(arena.into_shared());
        let mut map: HashMap<u32, u32, SharedArena> = HashMap::new(desc).unwrap();
        assert!(map.insert(1, 2));
        assert_eq!(map.get(&1), Some(2));
    }
}
