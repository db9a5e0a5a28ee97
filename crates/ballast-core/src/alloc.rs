//! Allocation capability trait and the process-heap implementation.
//!
//! Containers in this workspace do not allocate through a global hook; they
//! take an [`Allocator`] value in their descriptor and route every array
//! allocation through it. The trait is deliberately small: three byte-level
//! operations, sized on both ends so implementations that want the original
//! size back (arenas, pools) get it without their own bookkeeping.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// Minimum alignment guaranteed by every [`Allocator`] implementation.
///
/// Pointer-width alignment covers every key and value type the hash
/// containers accept. Implementations with configurable alignment must be
/// configured at or above this value before backing a container.
pub const MIN_ALIGN: usize = 8;

/// Byte-level allocation capability.
///
/// Implementations are infallible from the caller's point of view:
/// allocation failure is fatal (abort or panic), never a null return. This
/// keeps container code free of failure plumbing on a path where no
/// recovery exists.
pub trait Allocator {
    /// Allocate `size` bytes aligned to at least [`MIN_ALIGN`].
    ///
    /// The returned memory is uninitialised. A zero-size request returns a
    /// well-aligned dangling pointer that must not be dereferenced.
    fn alloc(&mut self, size: usize) -> NonNull<u8>;

    /// Release `size` bytes at `ptr`, previously returned by
    /// [`alloc`](Allocator::alloc) with the same size.
    ///
    /// Some implementations reclaim only the most recent allocation and
    /// treat everything else as a no-op; see the implementor's docs.
    fn free(&mut self, ptr: NonNull<u8>, size: usize);

    /// Resize an allocation, preserving the first
    /// `min(old_size, new_size)` bytes.
    fn realloc(&mut self, ptr: NonNull<u8>, old_size: usize, new_size: usize) -> NonNull<u8>;
}

/// [`Allocator`] over the process heap (`std::alloc`).
///
/// The default backing for hash containers. Zero-sized and `Copy`, so
/// descriptors can carry it by value.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

/// Well-aligned dangling pointer for zero-size allocations.
pub(crate) fn dangling() -> NonNull<u8> {
    NonNull::<u64>::dangling().cast()
}

fn heap_layout(size: usize) -> Layout {
    match Layout::from_size_align(size, MIN_ALIGN) {
        Ok(layout) => layout,
        Err(_) => panic!("allocation of {size} bytes overflows the address space"),
    }
}

impl Allocator for SystemAllocator {
    fn alloc(&mut self, size: usize) -> NonNull<u8> {
        if size == 0 {
            return dangling();
        }
        let layout = heap_layout(size);
        // SAFETY: `layout` has nonzero size.
        let raw = unsafe { alloc::alloc(layout) };
        match NonNull::new(raw) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(layout),
        }
    }

    fn free(&mut self, ptr: NonNull<u8>, size: usize) {
        if size == 0 {
            return;
        }
        // SAFETY: `ptr` came from `alloc` with this exact layout.
        unsafe { alloc::dealloc(ptr.as_ptr(), heap_layout(size)) };
    }

    fn realloc(&mut self, ptr: NonNull<u8>, old_size: usize, new_size: usize) -> NonNull<u8> {
        if old_size == 0 {
            return self.alloc(new_size);
        }
        if new_size == 0 {
            self.free(ptr, old_size);
            return dangling();
        }
        let layout = heap_layout(old_size);
        // SAFETY: `ptr` came from `alloc` with `layout`; `new_size` is
        // nonzero and fits the same alignment class.
        let raw = unsafe { alloc::realloc(ptr.as_ptr(), layout, new_size) };
        match NonNull::new(raw) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(heap_layout(new_size)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_pattern(ptr: NonNull<u8>, len: usize) {
        for i in 0..len {
            unsafe { ptr.as_ptr().add(i).write((i % 251) as u8) };
        }
    }

    fn check_pattern(ptr: NonNull<u8>, len: usize) -> bool {
        (0..len).all(|i| unsafe { ptr.as_ptr().add(i).read() } == (i % 251) as u8)
    }

    #[test]
    fn alloc_free_round_trip() {
        let mut alloc = SystemAllocator;
        let ptr = alloc.alloc(256);
        write_pattern(ptr, 256);
        assert!(check_pattern(ptr, 256));
        alloc.free(ptr, 256);
    }

    #[test]
    fn alloc_is_min_aligned() {
        let mut alloc = SystemAllocator;
        for size in [1, 3, 8, 17, 1000] {
            let ptr = alloc.alloc(size);
            assert_eq!(ptr.as_ptr() as usize % MIN_ALIGN, 0);
            alloc.free(ptr, size);
        }
    }

    #[test]
    fn zero_size_alloc_is_dangling_and_aligned() {
        let mut alloc = SystemAllocator;
        let ptr = alloc.alloc(0);
        assert_eq!(ptr.as_ptr() as usize % MIN_ALIGN, 0);
        // Freeing a zero-size allocation is a no-op.
        alloc.free(ptr, 0);
    }

    #[test]
    fn realloc_preserves_prefix() {
        let mut alloc = SystemAllocator;
        let ptr = alloc.alloc(64);
        write_pattern(ptr, 64);
        let bigger = alloc.realloc(ptr, 64, 4096);
        assert!(check_pattern(bigger, 64));
        let smaller = alloc.realloc(bigger, 4096, 16);
        assert!(check_pattern(smaller, 16));
        alloc.free(smaller, 16);
    }

    #[test]
    fn realloc_from_zero_allocates() {
        let mut alloc = SystemAllocator;
        let empty = alloc.alloc(0);
        let ptr = alloc.realloc(empty, 0, 32);
        write_pattern(ptr, 32);
        assert!(check_pattern(ptr, 32));
        alloc.free(ptr, 32);
    }

    #[test]
    fn realloc_to_zero_frees() {
        let mut alloc = SystemAllocator;
        let ptr = alloc.alloc(32);
        let empty = alloc.realloc(ptr, 32, 0);
        assert_eq!(empty.as_ptr() as usize % MIN_ALIGN, 0);
    }
}
