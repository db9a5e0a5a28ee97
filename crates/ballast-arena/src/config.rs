//! Arena configuration.

/// Default block size for eagerly committed arenas: 4 MiB.
pub const DEFAULT_BLOCK_SIZE: u64 = 4 * 1024 * 1024;

/// Default block size for virtual-memory arenas: 4 GiB.
///
/// A reservation costs address space, not memory, so the default is large
/// enough that a virtual-memory arena almost never chains.
pub const DEFAULT_VM_BLOCK_SIZE: u64 = 4 * 1024 * 1024 * 1024;

/// Default cursor alignment: pointer width.
pub const DEFAULT_ALIGNMENT: u64 = 8;

/// Configuration for [`Arena::new`](crate::Arena::new).
///
/// Construct via [`ArenaConfig::new`] or [`ArenaConfig::virtual_memory`]
/// and override fields as needed; validation happens at arena creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Capacity of each block in bytes. Must be a nonzero multiple of
    /// `alignment` with room past the reserved base region.
    pub block_size: u64,
    /// Cursor alignment quantum, a power of two. Push sizes round up to
    /// this, so the cursor stays aligned at all times.
    pub alignment: u64,
    /// Grow by appending blocks when the current block is exhausted.
    /// With chaining off, exhaustion is fatal.
    pub chaining: bool,
    /// Reserve whole blocks up front and commit pages as the cursor
    /// advances; popping decommits. Off means every block is committed in
    /// full when it is created.
    pub virtual_memory: bool,
    /// Label carried into metrics and registry dumps.
    pub tag: String,
}

impl ArenaConfig {
    /// Defaults for an eagerly committed arena: 4 MiB blocks, pointer
    /// alignment, chaining on.
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            alignment: DEFAULT_ALIGNMENT,
            chaining: true,
            virtual_memory: false,
            tag: "arena".to_string(),
        }
    }

    /// Defaults for a virtual-memory arena: one 4 GiB reservation,
    /// committed page by page as the cursor advances.
    pub fn virtual_memory() -> Self {
        Self {
            block_size: DEFAULT_VM_BLOCK_SIZE,
            virtual_memory: true,
            ..Self::new()
        }
    }

    /// Same config under a different metrics tag.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
