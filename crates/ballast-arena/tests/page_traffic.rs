//! Integration test: page traffic of arenas under push/pop workloads.
//!
//! Wraps the heap provider in a call-counting double and checks that
//! virtual-memory arenas commit only as the cursor advances and decommit
//! as it retreats, that eager arenas never touch page protections after
//! creation, and that chained blocks are released on pop and drop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ballast_arena::{Arena, ArenaConfig, HeapPages, PageProvider};

#[derive(Debug, Default)]
struct PageEvents {
    reserves: AtomicU64,
    releases: AtomicU64,
    commits: AtomicU64,
    commit_bytes: AtomicU64,
    decommits: AtomicU64,
    decommit_bytes: AtomicU64,
}

impl PageEvents {
    fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

/// Heap-backed provider that counts every call.
#[derive(Debug, Clone)]
struct CountingPages {
    inner: HeapPages,
    events: Arc<PageEvents>,
}

impl CountingPages {
    fn new() -> (Self, Arc<PageEvents>) {
        let events = Arc::new(PageEvents::default());
        (
            Self {
                inner: HeapPages,
                events: Arc::clone(&events),
            },
            events,
        )
    }
}

impl PageProvider for CountingPages {
    fn reserve(&self, size: u64) -> Option<std::ptr::NonNull<u8>> {
        self.events.reserves.fetch_add(1, Ordering::Relaxed);
        self.inner.reserve(size)
    }

    fn commit(&self, ptr: std::ptr::NonNull<u8>, size: u64) {
        self.events.commits.fetch_add(1, Ordering::Relaxed);
        self.events.commit_bytes.fetch_add(size, Ordering::Relaxed);
        self.inner.commit(ptr, size);
    }

    fn decommit(&self, ptr: std::ptr::NonNull<u8>, size: u64) {
        self.events.decommits.fetch_add(1, Ordering::Relaxed);
        self.events.decommit_bytes.fetch_add(size, Ordering::Relaxed);
        self.inner.decommit(ptr, size);
    }

    fn release(&self, ptr: std::ptr::NonNull<u8>, size: u64) {
        self.events.releases.fetch_add(1, Ordering::Relaxed);
        self.inner.release(ptr, size);
    }

    fn page_size(&self) -> u64 {
        self.inner.page_size()
    }
}

const PAGE: u64 = 4096;

fn vm_config(block_size: u64) -> ArenaConfig {
    ArenaConfig {
        block_size,
        virtual_memory: true,
        tag: "page-traffic".to_string(),
        ..ArenaConfig::new()
    }
}

#[test]
fn vm_arena_commits_with_the_cursor() {
    let (provider, events) = CountingPages::new();
    let mut arena = Arena::with_provider(vm_config(PAGE * 16), provider).unwrap();

    // Creation reserves the block and commits its first page.
    assert_eq!(PageEvents::get(&events.reserves), 1);
    assert_eq!(PageEvents::get(&events.commits), 1);
    assert_eq!(PageEvents::get(&events.commit_bytes), PAGE);

    // A push that stays inside the committed page adds nothing.
    arena.push(128);
    assert_eq!(PageEvents::get(&events.commits), 1);

    // Crossing the page boundary commits exactly the missing pages.
    arena.push(PAGE * 2);
    assert_eq!(PageEvents::get(&events.commits), 2);
    assert_eq!(PageEvents::get(&events.commit_bytes), PAGE + PAGE * 2);
}

#[test]
fn vm_arena_decommits_on_pop() {
    let (provider, events) = CountingPages::new();
    let mut arena = Arena::with_provider(vm_config(PAGE * 16), provider).unwrap();
    let base = arena.pos();

    arena.push(PAGE * 3);
    assert_eq!(PageEvents::get(&events.decommits), 0);

    arena.pop_to(base);
    // Committed high-water was 4 pages (base + 3 pages rounds up); the
    // first page stays for the cursor.
    assert_eq!(PageEvents::get(&events.decommits), 1);
    assert_eq!(PageEvents::get(&events.decommit_bytes), PAGE * 3);

    // Popping an already-low cursor decommits nothing further.
    arena.pop_to(0);
    assert_eq!(PageEvents::get(&events.decommits), 1);
}

#[test]
fn eager_arena_never_touches_pages_after_creation() {
    let (provider, events) = CountingPages::new();
    let config = ArenaConfig {
        block_size: PAGE * 4,
        tag: "eager".to_string(),
        ..ArenaConfig::new()
    };
    let mut arena = Arena::with_provider(config, provider).unwrap();
    assert_eq!(PageEvents::get(&events.commits), 1);
    assert_eq!(PageEvents::get(&events.commit_bytes), PAGE * 4);

    let base = arena.pos();
    for _ in 0..16 {
        arena.push(1000);
    }
    arena.pop_to(base);

    assert_eq!(PageEvents::get(&events.commits), 1);
    assert_eq!(PageEvents::get(&events.decommits), 0);
}

#[test]
fn chained_blocks_are_released_on_pop_and_drop() {
    let (provider, events) = CountingPages::new();
    let config = ArenaConfig {
        block_size: PAGE,
        tag: "chained".to_string(),
        ..ArenaConfig::new()
    };
    let mut arena = Arena::with_provider(config, provider).unwrap();
    let base = arena.pos();

    for _ in 0..10 {
        arena.push(PAGE / 2);
    }
    let reserved = PageEvents::get(&events.reserves);
    assert!(reserved >= 5, "expected chained growth, got {reserved} blocks");

    arena.pop_to(base);
    assert_eq!(PageEvents::get(&events.releases), reserved - 1);

    drop(arena);
    assert_eq!(PageEvents::get(&events.releases), reserved);
}

#[test]
fn metrics_survive_page_churn() {
    let (provider, _events) = CountingPages::new();
    let mut arena = Arena::with_provider(vm_config(PAGE * 8), provider).unwrap();
    let base = arena.pos();

    arena.push(PAGE);
    arena.push(PAGE);
    arena.pop_to(base);

    let metrics = arena.metrics();
    assert_eq!(metrics.tag, "page-traffic");
    assert_eq!(metrics.current_usage, base);
    assert_eq!(metrics.peak_usage, base + PAGE * 2);
    assert_eq!(metrics.push_operations, 2);
    assert_eq!(metrics.pop_operations, 1);
}
