//! Core allocation capabilities for the ballast toolkit.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! [`Allocator`] trait that the arena and the hash containers meet at, the
//! process-heap implementation that backs containers by default, and the
//! FNV-1a primitive the key helper functions build on.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod alloc;
pub mod hash;

pub use alloc::{Allocator, SystemAllocator, MIN_ALIGN};
pub use hash::fnv1a;
