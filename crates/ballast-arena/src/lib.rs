//! Position-addressed arena allocation with scratch pools and metrics.
//!
//! ```text
//! ballast-arena
//! ├── config     block size / alignment / chaining / virtual memory
//! ├── os         page providers (mmap on unix, heap fallback)
//! ├── arena      the bump allocator over a block chain
//! ├── temp       savepoint guards
//! ├── shared     cloneable arena handles
//! ├── scratch    thread-local scratch pool, begin/end protocol
//! └── metrics    per-arena counters and the process-wide registry
//! ```
//!
//! # Quick start
//!
//! ```
//! use ballast_arena::{Arena, ArenaConfig};
//!
//! let mut arena = Arena::new(ArenaConfig::new())?;
//! let checkpoint = arena.pos();
//! let _buf = arena.push(256); // zeroed, 8-byte aligned
//! arena.pop_to(checkpoint);   // everything past the checkpoint is gone
//! assert_eq!(arena.pos(), checkpoint);
//! # Ok::<(), ballast_arena::ArenaError>(())
//! ```
//!
//! For transient allocations inside a call tree, prefer the thread's
//! scratch pool over passing arenas around: see [`scratch_begin`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod alloc;
pub mod arena;
pub mod config;
pub mod error;
pub mod metrics;
pub mod os;
pub mod scratch;
pub mod shared;
pub mod temp;

pub use arena::Arena;
pub use config::{ArenaConfig, DEFAULT_ALIGNMENT, DEFAULT_BLOCK_SIZE, DEFAULT_VM_BLOCK_SIZE};
pub use error::ArenaError;
pub use metrics::{dump_registry, registry_snapshot, ArenaMetrics};
#[cfg(unix)]
pub use os::MmapPages;
pub use os::{DefaultPages, HeapPages, PageProvider};
pub use scratch::{scratch_begin, thread_ctx_init, thread_ctx_release, Scratch};
pub use shared::SharedArena;
pub use temp::Temp;
