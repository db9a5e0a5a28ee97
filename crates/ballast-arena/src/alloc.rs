//! Arena-backed [`Allocator`] implementations.
//!
//! The arena meets the container allocator seam with stack discipline:
//! `free` reclaims an allocation only when it is the most recent one, and
//! anything else stays put until the enclosing region pops. `realloc` is
//! free-then-alloc; when the free could not reclaim, the old bytes are
//! still live and the prefix is copied into the new allocation.

use std::ptr::NonNull;

use ballast_core::{Allocator, MIN_ALIGN};

use crate::arena::Arena;
use crate::os::PageProvider;
use crate::shared::SharedArena;

fn arena_realloc<P: PageProvider>(
    arena: &mut Arena<P>,
    ptr: NonNull<u8>,
    old_size: u64,
    new_size: u64,
) -> NonNull<u8> {
    if let Some(in_place) = arena.realloc_top_in_place(ptr, old_size, new_size) {
        // The allocation never moved, so its prefix is already intact.
        return in_place;
    }
    let dst = arena.push_no_zero(new_size);
    let keep = old_size.min(new_size) as usize;
    if keep > 0 {
        // The old allocation was not reclaimed and sits below the cursor.
        // SAFETY: both ranges are committed, `keep` bytes long, and
        // disjoint (the new allocation is above the old cursor).
        unsafe { std::ptr::copy_nonoverlapping(ptr.as_ptr(), dst.as_ptr(), keep) };
    }
    dst
}

/// Stack-discipline allocator over an exclusively borrowed arena.
///
/// Suits a container built, used and dropped inside one frame. When the
/// container and other pushes must interleave, use the [`SharedArena`]
/// impl instead.
impl<P: PageProvider> Allocator for &mut Arena<P> {
    fn alloc(&mut self, size: usize) -> NonNull<u8> {
        debug_assert!(
            self.alignment() >= MIN_ALIGN as u64,
            "arena alignment below the allocator contract"
        );
        self.push_no_zero(size as u64)
    }

    fn free(&mut self, ptr: NonNull<u8>, size: usize) {
        self.free_if_top(ptr, size as u64);
    }

    fn realloc(&mut self, ptr: NonNull<u8>, old_size: usize, new_size: usize) -> NonNull<u8> {
        arena_realloc(self, ptr, old_size as u64, new_size as u64)
    }
}

/// Stack-discipline allocator over a shared arena handle.
impl<P: PageProvider> Allocator for SharedArena<P> {
    fn alloc(&mut self, size: usize) -> NonNull<u8> {
        self.with(|arena| {
            debug_assert!(
                arena.alignment() >= MIN_ALIGN as u64,
                "arena alignment below the allocator contract"
            );
            arena.push_no_zero(size as u64)
        })
    }

    fn free(&mut self, ptr: NonNull<u8>, size: usize) {
        self.with(|arena| {
            arena.free_if_top(ptr, size as u64);
        })
    }

    fn realloc(&mut self, ptr: NonNull<u8>, old_size: usize, new_size: usize) -> NonNull<u8> {
        self.with(|arena| arena_realloc(arena, ptr, old_size as u64, new_size as u64))
    }
}
