//! Hash map and hash set over pluggable allocators.
//!
//! ```text
//! ballast-map
//! ├── desc       map/set descriptors and collision-resolution choice
//! ├── raw        typed array allocation over any Allocator
//! ├── open       open addressing with quadratic probing and tombstones
//! ├── chain      separate chaining over an index-linked node pool
//! ├── map        the HashMap surface dispatching over both strategies
//! ├── set        HashSet facade over a value-less map
//! └── helpers    FNV-1a key hashers and an equality slot filler
//! ```
//!
//! Containers here do not hash through a trait or allocate through the
//! global heap: the descriptor names a hash function, an equality
//! function, and an [`Allocator`](ballast_core::Allocator), so the same
//! map can sit on the process heap or carve its tables out of an arena.
//!
//! # Quick start
//!
//! ```
//! use ballast_map::{helpers, HashMap, MapDesc};
//!
//! let desc = MapDesc::new(8, helpers::hash_str, helpers::equal);
//! let mut map = HashMap::new(desc)?;
//! map.insert("life", 42u32);
//! assert_eq!(map.get(&"life"), Some(42));
//! # Ok::<(), ballast_map::MapError>(())
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod chain;
mod open;
mod raw;

pub mod desc;
pub mod error;
pub mod helpers;
pub mod map;
pub mod set;

pub use desc::{CollisionResolution, MapDesc, SetDesc};
pub use error::MapError;
pub use map::{HashMap, Iter};
pub use set::{HashSet, SetIter};
