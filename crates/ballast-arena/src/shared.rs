//! Shared arena handles.
//!
//! A [`SharedArena`] wraps an arena in `Rc<RefCell>` so container code
//! holding the handle as its allocator and caller code pushing scratch
//! data can interleave through clones of one handle. Every method borrows
//! the cell only for the duration of the call; re-entrant use from inside
//! [`with`](SharedArena::with) panics like any `RefCell` conflict.

use std::cell::RefCell;
use std::ptr::NonNull;
use std::rc::Rc;

use crate::arena::Arena;
use crate::metrics::ArenaMetrics;
use crate::os::{DefaultPages, PageProvider};

/// Cloneable owning handle to an arena.
///
/// Clones share the arena; it is released when the last handle drops.
/// Handles are single-threaded, like the arena itself.
#[derive(Debug)]
pub struct SharedArena<P: PageProvider = DefaultPages> {
    inner: Rc<RefCell<Arena<P>>>,
}

impl<P: PageProvider> Clone for SharedArena<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P: PageProvider> SharedArena<P> {
    pub(crate) fn new(arena: Arena<P>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(arena)),
        }
    }

    /// Forwarded [`Arena::push`].
    pub fn push(&self, size: u64) -> NonNull<u8> {
        self.inner.borrow_mut().push(size)
    }

    /// Forwarded [`Arena::push_no_zero`].
    pub fn push_no_zero(&self, size: u64) -> NonNull<u8> {
        self.inner.borrow_mut().push_no_zero(size)
    }

    /// Forwarded [`Arena::pop`].
    pub fn pop(&self, size: u64) {
        self.inner.borrow_mut().pop(size)
    }

    /// Forwarded [`Arena::pop_to`].
    pub fn pop_to(&self, pos: u64) {
        self.inner.borrow_mut().pop_to(pos)
    }

    /// Forwarded [`Arena::clear`].
    pub fn clear(&self) {
        self.inner.borrow_mut().clear()
    }

    /// Forwarded [`Arena::pos`].
    pub fn pos(&self) -> u64 {
        self.inner.borrow().pos()
    }

    /// Forwarded [`Arena::base_pos`].
    pub fn base_pos(&self) -> u64 {
        self.inner.borrow().base_pos()
    }

    /// Forwarded [`Arena::block_size`].
    pub fn block_size(&self) -> u64 {
        self.inner.borrow().block_size()
    }

    /// Forwarded [`Arena::metrics`].
    pub fn metrics(&self) -> ArenaMetrics {
        self.inner.borrow().metrics()
    }

    /// Metrics tag, cloned out of the cell.
    pub fn tag(&self) -> String {
        self.inner.borrow().tag().to_string()
    }

    /// Whether two handles refer to the same arena.
    pub fn same_arena(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run `f` with exclusive access to the arena.
    pub fn with<R>(&self, f: impl FnOnce(&mut Arena<P>) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }
}
