//! Position-addressed arena allocation.
//!
//! An [`Arena`] hands out memory by bumping a cursor through a chain of
//! fixed-size blocks. Positions are absolute byte offsets across the
//! chain: block `i` spans `[i * block_size, (i + 1) * block_size)`, so a
//! saved cursor is a savepoint and [`pop_to`](Arena::pop_to) is a rewind.
//!
//! ```text
//!            block 0                       block 1
//! ┌──────┬──────────────────────┐ ┌──────────────────────────────┐
//! │ base │ a0 │ a1 │ a2 │ ...   │ │ a7 │ a8 │ ...     cursor ─►  │
//! └──────┴──────────────────────┘ └──────────────────────────────┘
//!    ^ reserved region              ^ appended when chaining
//! ```
//!
//! The first bytes of block 0 are reserved, so position zero is never a
//! valid allocation and an empty arena's cursor sits at
//! [`base_pos`](Arena::base_pos). The cursor is aligned at all times:
//! every push rounds its size up to the alignment quantum, and an
//! allocation never straddles two blocks.

use std::ptr::NonNull;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::metrics::{self, ArenaMetrics, ArenaStats};
use crate::os::{DefaultPages, PageProvider};
use crate::shared::SharedArena;

/// Bytes reserved at the front of the first block.
pub(crate) const HEADER_RESERVE: u64 = 64;

/// Round `value` up to the next multiple of power-of-two `align`.
pub(crate) fn align_up(value: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// One reserved span in the chain.
#[derive(Debug)]
struct Block {
    /// Base address of the reservation.
    base: NonNull<u8>,
    /// Committed bytes from the base; equals the block size in eager
    /// arenas, a page multiple in virtual-memory arenas.
    committed: u64,
}

/// Position-addressed bump allocator over a chain of fixed-size blocks.
///
/// Allocation is [`push`](Arena::push) / [`push_no_zero`](Arena::push_no_zero);
/// deallocation is wholesale, by rewinding the cursor with
/// [`pop`](Arena::pop), [`pop_to`](Arena::pop_to) or
/// [`clear`](Arena::clear). Individual frees exist only through the
/// [`Allocator`](ballast_core::Allocator) impl, with stack discipline.
///
/// An arena is single-threaded; wrap it with
/// [`into_shared`](Arena::into_shared) when container code and caller code
/// need to interleave pushes through one handle.
pub struct Arena<P: PageProvider = DefaultPages> {
    /// Block chain. Never empty; the cursor lies within the last block's
    /// span (end inclusive).
    blocks: SmallVec<[Block; 4]>,
    /// Absolute cursor.
    pos: u64,
    /// Cursor floor: the aligned end of the reserved base region.
    base: u64,
    block_size: u64,
    alignment: u64,
    chaining: bool,
    virtual_memory: bool,
    /// Counter cell shared with the registry.
    stats: Arc<ArenaStats>,
    provider: P,
}

impl Arena<DefaultPages> {
    /// Create an arena on the platform's default page provider.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        Self::with_provider(config, DefaultPages::default())
    }
}

impl<P: PageProvider> Arena<P> {
    /// Create an arena on a specific page provider.
    ///
    /// The provider seam exists for tests (commit-counting doubles) and
    /// embedders with their own page source; everyone else wants
    /// [`Arena::new`].
    pub fn with_provider(config: ArenaConfig, provider: P) -> Result<Self, ArenaError> {
        validate(&config)?;
        let first = reserve_block(&provider, config.block_size, config.virtual_memory)
            .ok_or(ArenaError::ReserveFailed {
                requested: config.block_size,
            })?;
        let base = align_up(HEADER_RESERVE, config.alignment);
        let stats = ArenaStats::new(config.tag.clone(), base);
        let mut blocks = SmallVec::new();
        blocks.push(first);
        Ok(Self {
            blocks,
            pos: base,
            base,
            block_size: config.block_size,
            alignment: config.alignment,
            chaining: config.chaining,
            virtual_memory: config.virtual_memory,
            stats,
            provider,
        })
    }

    /// Absolute cursor position.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Cursor floor: the position of an empty arena.
    pub fn base_pos(&self) -> u64 {
        self.base
    }

    /// Block capacity in bytes.
    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Cursor alignment quantum.
    pub fn alignment(&self) -> u64 {
        self.alignment
    }

    /// Metrics tag.
    pub fn tag(&self) -> &str {
        self.stats.tag()
    }

    /// Snapshot of this arena's counters.
    pub fn metrics(&self) -> ArenaMetrics {
        self.stats.snapshot()
    }

    /// Allocate `size` bytes without zeroing.
    ///
    /// The cursor advances by `size` rounded up to the alignment quantum.
    /// When the allocation does not fit the current block and chaining is
    /// on, a fresh block is appended and the allocation starts at its
    /// base. Previously popped memory may keep its old contents; use
    /// [`push`](Arena::push) where zeroed memory matters.
    ///
    /// # Panics
    ///
    /// Panics when `size` exceeds the block size, when the current block
    /// is exhausted with chaining off, or when appending a block fails.
    pub fn push_no_zero(&mut self, size: u64) -> NonNull<u8> {
        assert!(
            size <= self.block_size,
            "arena push of {size} bytes exceeds the block size ({})",
            self.block_size
        );
        let aligned = align_up(size, self.alignment);
        let mut chain_index = (self.blocks.len() - 1) as u64;
        let mut start = self.pos;
        let mut new_pos = start + aligned;
        if new_pos > (chain_index + 1) * self.block_size {
            assert!(
                self.chaining,
                "arena block exhausted at position {} and chaining is off",
                self.pos
            );
            let block = reserve_block(&self.provider, self.block_size, self.virtual_memory)
                .unwrap_or_else(|| {
                    panic!("failed to reserve a {} byte arena block", self.block_size)
                });
            self.blocks.push(block);
            chain_index += 1;
            start = chain_index * self.block_size;
            new_pos = start + aligned;
            tracing::debug!(
                tag = %self.stats.tag(),
                blocks = self.blocks.len(),
                "arena chained a new block"
            );
        }
        self.pos = new_pos;
        if self.virtual_memory {
            self.commit_through(chain_index, new_pos);
        }
        self.stats.record_push(aligned, new_pos);
        self.addr_at(chain_index, start)
    }

    /// Allocate `size` bytes of zeroed memory.
    ///
    /// # Panics
    ///
    /// Same conditions as [`push_no_zero`](Arena::push_no_zero).
    pub fn push(&mut self, size: u64) -> NonNull<u8> {
        let ptr = self.push_no_zero(size);
        // SAFETY: `ptr` addresses at least `size` committed bytes.
        unsafe { ptr.as_ptr().write_bytes(0, size as usize) };
        ptr
    }

    /// Pop `size` bytes off the cursor.
    ///
    /// # Panics
    ///
    /// Panics when `size` exceeds the cursor position.
    pub fn pop(&mut self, size: u64) {
        assert!(
            size <= self.pos,
            "arena pop of {size} bytes passes the cursor ({})",
            self.pos
        );
        self.pop_to(self.pos - size);
    }

    /// Move the cursor back to absolute position `pos`, floored at
    /// [`base_pos`](Arena::base_pos).
    ///
    /// Blocks past the target are released. In virtual-memory mode the
    /// remaining block decommits down to the page holding the cursor, so
    /// the popped span reads as zero when pushed into again; eager arenas
    /// leave the bytes in place.
    ///
    /// # Panics
    ///
    /// Panics when `pos` is ahead of the cursor.
    pub fn pop_to(&mut self, pos: u64) {
        assert!(
            pos <= self.pos,
            "arena pop_to({pos}) is ahead of the cursor ({})",
            self.pos
        );
        let target = pos.max(self.base);
        let released = self.pos - target;
        // A target sitting exactly on a block boundary is end-inclusive of
        // the block before it, so the index clamps to the chain.
        let target_index = (target / self.block_size).min((self.blocks.len() - 1) as u64);
        let mut dropped = 0usize;
        while (self.blocks.len() - 1) as u64 > target_index {
            if let Some(block) = self.blocks.pop() {
                self.provider.release(block.base, self.block_size);
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::debug!(
                tag = %self.stats.tag(),
                released = dropped,
                blocks = self.blocks.len(),
                "arena released chained blocks"
            );
        }
        self.pos = target;
        if self.virtual_memory {
            self.decommit_past(target_index, target);
        }
        self.stats.record_pop(released, target);
    }

    /// Rewind the cursor to the base position.
    pub fn clear(&mut self) {
        self.pop_to(0);
    }

    /// Wrap this arena in a cloneable shared handle.
    pub fn into_shared(self) -> SharedArena<P> {
        SharedArena::new(self)
    }

    /// Whether `ptr` with unaligned size `size` is the most recent
    /// allocation.
    pub(crate) fn is_top(&self, ptr: NonNull<u8>, size: u64) -> bool {
        let aligned = align_up(size, self.alignment);
        let chain_index = (self.blocks.len() - 1) as u64;
        let intra = self.pos - chain_index * self.block_size;
        if aligned > intra {
            return false;
        }
        self.addr_at(chain_index, self.pos - aligned) == ptr
    }

    /// Pop `ptr` when it is the most recent allocation; report whether it
    /// was.
    pub(crate) fn free_if_top(&mut self, ptr: NonNull<u8>, size: u64) -> bool {
        if self.is_top(ptr, size) {
            self.pop(align_up(size, self.alignment));
            true
        } else {
            false
        }
    }

    /// Resize the most recent allocation in place when the result still
    /// fits its block. The returned pointer equals `ptr`, so contents are
    /// untouched.
    pub(crate) fn realloc_top_in_place(
        &mut self,
        ptr: NonNull<u8>,
        old_size: u64,
        new_size: u64,
    ) -> Option<NonNull<u8>> {
        if new_size > self.block_size || !self.is_top(ptr, old_size) {
            return None;
        }
        let aligned_old = align_up(old_size, self.alignment);
        let aligned_new = align_up(new_size, self.alignment);
        let chain_index = (self.blocks.len() - 1) as u64;
        let start = self.pos - aligned_old;
        if start + aligned_new > (chain_index + 1) * self.block_size {
            return None;
        }
        self.pop_to(start);
        Some(self.push_no_zero(new_size))
    }

    /// Address of absolute position `pos`, which must lie within block
    /// `chain_index`'s span (end inclusive, for zero-size results).
    fn addr_at(&self, chain_index: u64, pos: u64) -> NonNull<u8> {
        let offset = pos - chain_index * self.block_size;
        debug_assert!(offset <= self.block_size);
        let block = &self.blocks[chain_index as usize];
        // SAFETY: `offset` stays within the block's reservation, and the
        // block base is non-null.
        unsafe { NonNull::new_unchecked(block.base.as_ptr().add(offset as usize)) }
    }

    /// Raise the last block's commit high-water to cover `new_pos`.
    fn commit_through(&mut self, chain_index: u64, new_pos: u64) {
        let page = self.provider.page_size();
        let intra_end = new_pos - chain_index * self.block_size;
        let want = align_up(intra_end, page);
        let block = &mut self.blocks[chain_index as usize];
        if want > block.committed {
            // SAFETY: `committed` is a page multiple within the block.
            let at = unsafe {
                NonNull::new_unchecked(block.base.as_ptr().add(block.committed as usize))
            };
            self.provider.commit(at, want - block.committed);
            block.committed = want;
            tracing::debug!(
                tag = %self.stats.tag(),
                committed = want,
                "arena committed pages"
            );
        }
    }

    /// Lower the last block's commit high-water to the page holding `pos`.
    fn decommit_past(&mut self, chain_index: u64, pos: u64) {
        let page = self.provider.page_size();
        let intra = pos - chain_index * self.block_size;
        let keep = align_up(intra, page);
        let block = &mut self.blocks[chain_index as usize];
        if keep < block.committed {
            // SAFETY: `keep` is a page multiple within the block.
            let at =
                unsafe { NonNull::new_unchecked(block.base.as_ptr().add(keep as usize)) };
            self.provider.decommit(at, block.committed - keep);
            block.committed = keep;
            tracing::debug!(
                tag = %self.stats.tag(),
                committed = keep,
                "arena decommitted pages"
            );
        }
    }
}

impl<P: PageProvider> Drop for Arena<P> {
    fn drop(&mut self) {
        while let Some(block) = self.blocks.pop() {
            self.provider.release(block.base, self.block_size);
        }
        metrics::unregister(self.stats.id());
    }
}

impl<P: PageProvider> std::fmt::Debug for Arena<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("tag", &self.tag())
            .field("pos", &self.pos)
            .field("blocks", &self.blocks.len())
            .field("block_size", &self.block_size)
            .finish_non_exhaustive()
    }
}

fn validate(config: &ArenaConfig) -> Result<(), ArenaError> {
    if config.block_size == 0 {
        return Err(ArenaError::InvalidConfig {
            reason: "block_size must be nonzero".to_string(),
        });
    }
    if !config.alignment.is_power_of_two() {
        return Err(ArenaError::InvalidConfig {
            reason: format!("alignment must be a power of two (got {})", config.alignment),
        });
    }
    if config.block_size % config.alignment != 0 {
        return Err(ArenaError::InvalidConfig {
            reason: format!(
                "block_size ({}) must be a multiple of alignment ({})",
                config.block_size, config.alignment
            ),
        });
    }
    let base = align_up(HEADER_RESERVE, config.alignment);
    if config.block_size < base.saturating_add(config.alignment) {
        return Err(ArenaError::InvalidConfig {
            reason: format!(
                "block_size ({}) leaves no room past the {base} byte reserved region",
                config.block_size
            ),
        });
    }
    Ok(())
}

fn reserve_block<P: PageProvider>(
    provider: &P,
    block_size: u64,
    virtual_memory: bool,
) -> Option<Block> {
    let base = provider.reserve(block_size)?;
    let committed = if virtual_memory {
        let first = provider.page_size().min(block_size);
        provider.commit(base, first);
        first
    } else {
        provider.commit(base, block_size);
        block_size
    };
    Some(Block {
        base,
        committed,
    })
}

// ── Tests ───────────────────────────────────────────────────────────────
