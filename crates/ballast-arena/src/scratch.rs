//! Thread-local scratch arenas.
//!
//! Transient workspaces follow a begin/end protocol: [`scratch_begin`]
//! borrows one of the calling thread's pool arenas at its current cursor,
//! and [`Scratch::end`] (or dropping the handle) pops everything the
//! region pushed. Two pool arenas cover the composition hazard: a function
//! handed scratch memory by its caller opens its own region on the other
//! arena by naming the caller's as a conflict, so the inner region cannot
//! pop the outer one's data.
//!
//! Without [`thread_ctx_init`], [`scratch_begin`] returns an inert handle
//! whose operations do nothing. Code that uses scratch incidentally keeps
//! working; it just gets no arena-backed memory.

use std::cell::RefCell;

use crate::arena::Arena;
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::shared::SharedArena;

thread_local! {
    static THREAD_CTX: RefCell<Option<ThreadCtx>> = const { RefCell::new(None) };
}

/// Number of arenas in a thread's scratch pool.
const POOL_SIZE: usize = 2;

/// Pool of scratch arenas owned by one thread.
struct ThreadCtx {
    /// Pool members; slots empty out in reverse order on teardown.
    pool: [Option<SharedArena>; POOL_SIZE],
}

impl Drop for ThreadCtx {
    fn drop(&mut self) {
        for slot in self.pool.iter_mut().rev() {
            slot.take();
        }
    }
}

/// Create the calling thread's scratch pool.
///
/// `config` is the template for every pool arena; each gets its own tag
/// (`scratch-0`, `scratch-1`). Fails if the thread already has a pool or
/// the config fails validation.
pub fn thread_ctx_init(config: ArenaConfig) -> Result<(), ArenaError> {
    THREAD_CTX.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_some() {
            return Err(ArenaError::CtxAlreadyInitialized);
        }
        let mut pool: [Option<SharedArena>; POOL_SIZE] = [None, None];
        for (i, entry) in pool.iter_mut().enumerate() {
            let arena_config = config.clone().with_tag(&format!("scratch-{i}"));
            *entry = Some(Arena::new(arena_config)?.into_shared());
        }
        *slot = Some(ThreadCtx {
            pool,
        });
        Ok(())
    })
}

/// Tear down the calling thread's scratch pool, releasing the arenas in
/// reverse creation order. A thread without a pool is a no-op.
///
/// Live [`Scratch`] handles keep their arena alive past release; the
/// arena is freed when the last handle drops.
pub fn thread_ctx_release() {
    THREAD_CTX.with(|cell| {
        cell.borrow_mut().take();
    });
}

/// Transient region on a thread-pool arena. See the module docs.
#[must_use = "a scratch region restores its arena when it ends; bind it to a name"]
#[derive(Debug)]
pub struct Scratch {
    arena: Option<SharedArena>,
    start: u64,
}

impl Scratch {
    /// The pool arena backing this region, or `None` for an inert handle.
    pub fn arena(&self) -> Option<&SharedArena> {
        self.arena.as_ref()
    }

    /// Cursor captured when the region opened. Zero for inert handles.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Close the region, popping the backing arena to the saved cursor.
    pub fn end(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if let Some(arena) = self.arena.take() {
            arena.pop_to(self.start);
        }
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Open a scratch region on a pool arena that none of `conflicts` use.
///
/// Callers name every scratch-backed arena they were handed; the selected
/// pool member matches none of them, so nested regions cannot clobber each
/// other. Returns an inert handle when the thread has no pool or every
/// pool member conflicts.
pub fn scratch_begin(conflicts: &[&SharedArena]) -> Scratch {
    THREAD_CTX.with(|cell| {
        let slot = cell.borrow();
        let Some(ctx) = slot.as_ref() else {
            return Scratch {
                arena: None,
                start: 0,
            };
        };
        for entry in ctx.pool.iter().flatten() {
            let clashes = conflicts.iter().any(|conflict| conflict.same_arena(entry));
            if !clashes {
                return Scratch {
                    start: entry.pos(),
                    arena: Some(entry.clone()),
                };
            }
        }
        Scratch {
            arena: None,
            start: 0,
        }
    })
}
