//! Savepoint regions.

use crate::arena::Arena;
use crate::os::{DefaultPages, PageProvider};

/// Savepoint on an arena: everything pushed after
/// [`begin`](Temp::begin) is popped when the region ends.
///
/// Regions nest; restoring an outer savepoint discards whatever inner
/// regions left behind. Dropping the guard restores too, so early returns
/// and panics unwind the arena correctly — [`end`](Temp::end) is the
/// explicit spelling for straight-line code.
#[must_use = "a temp region restores the arena when it ends; bind it to a name"]
#[derive(Debug)]
pub struct Temp<'a, P: PageProvider = DefaultPages> {
    arena: &'a mut Arena<P>,
    start: u64,
}

impl<'a, P: PageProvider> Temp<'a, P> {
    /// Open a savepoint at the arena's current cursor.
    pub fn begin(arena: &'a mut Arena<P>) -> Self {
        let start = arena.pos();
        Self {
            arena,
            start,
        }
    }

    /// The arena, for pushes inside the region.
    pub fn arena(&mut self) -> &mut Arena<P> {
        self.arena
    }

    /// Cursor position captured at [`begin`](Temp::begin).
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Close the region, popping the arena back to the savepoint.
    pub fn end(self) {}
}

impl<P: PageProvider> Drop for Temp<'_, P> {
    fn drop(&mut self) {
        self.arena.pop_to(self.start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::os::HeapPages;

    fn make_arena() -> Arena<HeapPages> {
        let config = ArenaConfig {
            block_size: 64 * 1024,
            tag: "temp-test".to_string(),
            ..ArenaConfig::new()
        };
        Arena::with_provider(config, HeapPages).unwrap()
    }

    #[test]
    fn end_restores_the_cursor() {
        let mut arena = make_arena();
        arena.push(100);
        let outside = arena.pos();

        let mut temp = Temp::begin(&mut arena);
        temp.arena().push(500);
        temp.arena().push(300);
        assert!(temp.arena().pos() > outside);
        temp.end();

        assert_eq!(arena.pos(), outside);
    }

    #[test]
    fn drop_restores_the_cursor() {
        let mut arena = make_arena();
        let outside = arena.pos();
        {
            let mut temp = Temp::begin(&mut arena);
            temp.arena().push(128);
        }
        assert_eq!(arena.pos(), outside);
    }

    #[test]
    fn regions_nest_lifo() {
        let mut arena = make_arena();
        let level0 = arena.pos();

        let mut outer = Temp::begin(&mut arena);
        outer.arena().push(64);
        let level1 = outer.arena().pos();

        {
            let mut inner = Temp::begin(outer.arena());
            inner.arena().push(64);
            inner.end();
        }
        assert_eq!(outer.arena().pos(), level1);

        outer.end();
        assert_eq!(arena.pos(), level0);
    }

    #[test]
    fn start_reports_the_savepoint() {
        let mut arena = make_arena();
        arena.push(48);
        let at = arena.pos();
        let temp = Temp::begin(&mut arena);
        assert_eq!(temp.start(), at);
        temp.end();
    }
}
