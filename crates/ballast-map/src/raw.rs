//! Typed array allocation over an [`Allocator`].
//!
//! The containers store entries in flat arrays whose slots are only
//! initialised while a key lives in them, so the arrays cannot be `Vec`s.
//! This module is the bounded-unsafe core: a [`RawArray`] owns `len`
//! slots of `T` obtained from an allocator and exposes indexed reads and
//! writes with an initialisation contract stated per method. The only
//! other unsafe in the crate is the chain nodes' state-gated payload
//! access, which follows the same contract.
//!
//! A `RawArray` does not remember its allocator; the owning container
//! frees it explicitly through [`RawArray::free`] before dropping it.

use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use ballast_core::{Allocator, MIN_ALIGN};

/// `len` slots of `T` carved out of an allocator.
///
/// Zero-sized element types and zero lengths allocate nothing and hand
/// out a dangling, well-aligned pointer.
pub(crate) struct RawArray<T> {
    ptr: NonNull<T>,
    len: u32,
    _marker: PhantomData<T>,
}

impl<T> RawArray<T> {
    fn byte_len(len: u32) -> usize {
        mem::size_of::<T>() * len as usize
    }

    /// Allocate `len` uninitialised slots.
    ///
    /// `T`'s alignment must not exceed [`MIN_ALIGN`]; the caller
    /// validates that at descriptor level, this is the backstop.
    pub(crate) fn new_uninit<A: Allocator>(allocator: &mut A, len: u32) -> Self {
        debug_assert!(mem::align_of::<T>() <= MIN_ALIGN);
        let raw = allocator.alloc(Self::byte_len(len));
        Self {
            ptr: raw.cast(),
            len,
            _marker: PhantomData,
        }
    }

    /// Allocate `len` slots with every byte zeroed.
    ///
    /// Only sound as an initialiser when the all-zero bit pattern is a
    /// valid `T` (the slot-state arrays qualify).
    pub(crate) fn new_zeroed<A: Allocator>(allocator: &mut A, len: u32) -> Self {
        let array = Self::new_uninit(allocator, len);
        if mem::size_of::<T>() != 0 && len != 0 {
            // SAFETY: the allocation spans exactly this many bytes.
            unsafe { array.ptr.as_ptr().cast::<u8>().write_bytes(0, Self::byte_len(len)) };
        }
        array
    }

    /// Return the allocation to `allocator`. The array must not be used
    /// afterwards; the container drops it right after this call.
    pub(crate) fn free<A: Allocator>(&mut self, allocator: &mut A) {
        allocator.free(self.ptr.cast(), Self::byte_len(self.len));
        self.len = 0;
    }

    /// Slot count.
    pub(crate) fn len(&self) -> u32 {
        self.len
    }

    fn slot(&self, index: u32) -> *mut T {
        debug_assert!(index < self.len || mem::size_of::<T>() == 0);
        // SAFETY: `index` is within the allocation (ZSTs never move the
        // pointer).
        unsafe { self.ptr.as_ptr().add(index as usize) }
    }

    /// Copy the value out of slot `index`, which must be initialised.
    pub(crate) fn read(&self, index: u32) -> T
    where
        T: Copy,
    {
        // SAFETY: slot is in bounds and the caller guarantees it holds a
        // live `T`.
        unsafe { self.slot(index).read() }
    }

    /// Write `value` into slot `index`, initialising it.
    pub(crate) fn write(&mut self, index: u32, value: T) {
        // SAFETY: slot is in bounds; `T: Copy` containers never need the
        // old value dropped.
        unsafe { self.slot(index).write(value) };
    }

    /// Borrow slot `index`, which must be initialised.
    pub(crate) fn ref_at(&self, index: u32) -> &T {
        // SAFETY: slot is in bounds and initialised per the caller.
        unsafe { &*self.slot(index) }
    }

    /// Mutably borrow slot `index`, which must be initialised.
    pub(crate) fn mut_at(&mut self, index: u32) -> &mut T {
        // SAFETY: slot is in bounds and initialised per the caller.
        unsafe { &mut *self.slot(index) }
    }

    /// Copy the first `count` slots into `dst`, which must be at least as
    /// long. Source slots may be uninitialised; the copy is byte-wise and
    /// the initialisation state carries over.
    pub(crate) fn copy_prefix_into(&self, dst: &mut RawArray<T>, count: u32) {
        debug_assert!(count <= self.len && count <= dst.len);
        if mem::size_of::<T>() == 0 || count == 0 {
            return;
        }
        // SAFETY: both allocations cover `count` slots and are distinct.
        unsafe {
            std::ptr::copy_nonoverlapping(self.ptr.as_ptr(), dst.ptr.as_ptr(), count as usize);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballast_core::SystemAllocator;

    #[test]
    fn write_then_read_round_trips() {
        let mut allocator = SystemAllocator;
        let mut array: RawArray<u64> = RawArray::new_uninit(&mut allocator, 16);
        for i in 0..16 {
            array.write(i, u64::from(i) * 3);
        }
        for i in 0..16 {
            assert_eq!(array.read(i), u64::from(i) * 3);
        }
        array.free(&mut allocator);
    }

    #[test]
    fn zeroed_array_reads_as_zero() {
        let mut allocator = SystemAllocator;
        let array: RawArray<u8> = RawArray::new_zeroed(&mut allocator, 64);
        assert!((0..64).all(|i| array.read(i) == 0));
        let mut array = array;
        array.free(&mut allocator);
    }

    #[test]
    fn refs_observe_writes() {
        let mut allocator = SystemAllocator;
        let mut array: RawArray<(u32, u32)> = RawArray::new_uninit(&mut allocator, 4);
        array.write(2, (7, 9));
        assert_eq!(*array.ref_at(2), (7, 9));
        array.mut_at(2).1 = 11;
        assert_eq!(array.read(2), (7, 11));
        array.free(&mut allocator);
    }

    #[test]
    fn zero_sized_elements_allocate_nothing() {
        let mut allocator = SystemAllocator;
        let mut array: RawArray<()> = RawArray::new_uninit(&mut allocator, 1024);
        array.write(512, ());
        array.read(512);
        array.free(&mut allocator);
    }

    #[test]
    fn copy_prefix_moves_contents() {
        let mut allocator = SystemAllocator;
        let mut src: RawArray<u32> = RawArray::new_uninit(&mut allocator, 8);
        for i in 0..8 {
            src.write(i, i * i);
        }
        let mut dst: RawArray<u32> = RawArray::new_uninit(&mut allocator, 16);
        src.copy_prefix_into(&mut dst, 8);
        assert!((0..8).all(|i| dst.read(i) == i * i));
        src.free(&mut allocator);
        dst.free(&mut allocator);
    }
}
