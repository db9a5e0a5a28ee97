//! Page-grained memory providers.
//!
//! An arena block is a contiguous span obtained from a [`PageProvider`]:
//! reserved once at full size, committed (made readable and writable) in
//! page multiples as the cursor advances, decommitted as it retreats. The
//! unix provider maps this onto `mmap`/`mprotect`; [`HeapPages`] commits
//! eagerly and is the portable fallback. The trait is a seam so tests can
//! observe commit traffic with a counting provider.

use std::ptr::NonNull;

/// Reserve/commit/decommit/release capability at page granularity.
///
/// `commit` and `decommit` receive addresses at page-multiple offsets into
/// a live reservation. Commit failure is fatal: an arena that cannot back
/// its cursor has nothing sensible to return.
pub trait PageProvider {
    /// Reserve `size` bytes of address space, inaccessible until
    /// committed (on-demand implementations). Returns `None` on failure.
    fn reserve(&self, size: u64) -> Option<NonNull<u8>>;

    /// Make `[ptr, ptr + size)` readable and writable. Newly committed
    /// pages read as zero in on-demand implementations.
    fn commit(&self, ptr: NonNull<u8>, size: u64);

    /// Return `[ptr, ptr + size)` to reserved-only state, discarding its
    /// contents.
    fn decommit(&self, ptr: NonNull<u8>, size: u64);

    /// Release a reservation made by [`reserve`](PageProvider::reserve),
    /// with the size it was reserved at.
    fn release(&self, ptr: NonNull<u8>, size: u64);

    /// Commit granularity in bytes. Always a power of two.
    fn page_size(&self) -> u64;
}

/// Provider over `mmap`/`mprotect`.
///
/// Reservations are `PROT_NONE` anonymous mappings; commit flips page
/// protections to read/write, decommit flips them back and drops the
/// backing pages, so decommitted memory reads as zero when recommitted.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, Default)]
pub struct MmapPages;

#[cfg(unix)]
impl PageProvider for MmapPages {
    fn reserve(&self, size: u64) -> Option<NonNull<u8>> {
        // SAFETY: anonymous private mapping with no fd; the kernel picks
        // the address.
        let raw = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size as usize,
                libc::PROT_NONE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if raw == libc::MAP_FAILED {
            return None;
        }
        NonNull::new(raw.cast())
    }

    fn commit(&self, ptr: NonNull<u8>, size: u64) {
        // SAFETY: `ptr` is page-aligned inside a live mapping.
        let rc = unsafe {
            libc::mprotect(
                ptr.as_ptr().cast(),
                size as usize,
                libc::PROT_READ | libc::PROT_WRITE,
            )
        };
        assert!(rc == 0, "mprotect failed to commit {size} bytes");
    }

    fn decommit(&self, ptr: NonNull<u8>, size: u64) {
        // SAFETY: `ptr` is page-aligned inside a live mapping.
        let rc = unsafe { libc::mprotect(ptr.as_ptr().cast(), size as usize, libc::PROT_NONE) };
        assert!(rc == 0, "mprotect failed to decommit {size} bytes");
        // Drop the backing pages so recommitted memory reads as zero.
        // Best effort: the protection change above already guarantees
        // faults on stray access.
        // SAFETY: same live, page-aligned range.
        unsafe {
            libc::madvise(ptr.as_ptr().cast(), size as usize, libc::MADV_DONTNEED);
        }
    }

    fn release(&self, ptr: NonNull<u8>, size: u64) {
        // SAFETY: `ptr` is a mapping returned by `reserve` at this size.
        let rc = unsafe { libc::munmap(ptr.as_ptr().cast(), size as usize) };
        debug_assert!(rc == 0, "munmap failed");
    }

    fn page_size(&self) -> u64 {
        use std::sync::OnceLock;
        static PAGE: OnceLock<u64> = OnceLock::new();
        *PAGE.get_or_init(|| {
            // SAFETY: sysconf has no preconditions.
            let raw = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
            if raw > 0 {
                raw as u64
            } else {
                4096
            }
        })
    }
}

/// Eagerly committed provider over the process heap.
///
/// `reserve` allocates zeroed memory; commit and decommit are no-ops, so
/// virtual-memory arenas degrade to eager commit and popped bytes keep
/// their contents. The default on non-unix targets, and handy in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapPages;

/// Alignment of heap-provided blocks: one conventional page.
const HEAP_BLOCK_ALIGN: usize = 4096;

impl PageProvider for HeapPages {
    fn reserve(&self, size: u64) -> Option<NonNull<u8>> {
        let layout = std::alloc::Layout::from_size_align(size as usize, HEAP_BLOCK_ALIGN).ok()?;
        if layout.size() == 0 {
            return None;
        }
        // SAFETY: nonzero size.
        let raw = unsafe { std::alloc::alloc_zeroed(layout) };
        NonNull::new(raw)
    }

    fn commit(&self, _ptr: NonNull<u8>, _size: u64) {}

    fn decommit(&self, _ptr: NonNull<u8>, _size: u64) {}

    fn release(&self, ptr: NonNull<u8>, size: u64) {
        if let Ok(layout) = std::alloc::Layout::from_size_align(size as usize, HEAP_BLOCK_ALIGN) {
            // SAFETY: `ptr` came from `reserve` with this layout.
            unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
        }
    }

    fn page_size(&self) -> u64 {
        HEAP_BLOCK_ALIGN as u64
    }
}

/// Provider used by [`Arena::new`](crate::Arena::new).
#[cfg(unix)]
pub type DefaultPages = MmapPages;

/// Provider used by [`Arena::new`](crate::Arena::new).
#[cfg(not(unix))]
pub type DefaultPages = HeapPages;
