//! Arena metrics and the process-wide registry.
//!
//! Every arena owns a shared counter cell that it updates on push and pop;
//! the registry holds a weak-ordered view of every live cell so a process
//! can dump usage across all arenas at any point. Counters are
//! observational only: nothing in the allocation path reads them back.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use indexmap::IndexMap;

/// Snapshot of one arena's counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaMetrics {
    /// Process-unique arena id, assigned in creation order.
    pub id: u32,
    /// Tag from the arena's config.
    pub tag: String,
    /// Cursor position in bytes, including the reserved base region.
    pub current_usage: u64,
    /// High-water cursor position.
    pub peak_usage: u64,
    /// Number of push operations.
    pub push_operations: u64,
    /// Number of pop operations (`pop`, `pop_to`, `clear`).
    pub pop_operations: u64,
    /// Total aligned bytes pushed over the arena's lifetime.
    pub total_pushed_bytes: u64,
    /// Total bytes popped over the arena's lifetime.
    pub total_popped_bytes: u64,
}

/// Counter cell shared between an arena and the registry.
///
/// The owning arena stores; registry readers load. All accesses are
/// relaxed: the counters are a monitoring surface, not a synchronization
/// point.
#[derive(Debug)]
pub(crate) struct ArenaStats {
    id: u32,
    tag: String,
    current: AtomicU64,
    peak: AtomicU64,
    pushes: AtomicU64,
    pops: AtomicU64,
    pushed_bytes: AtomicU64,
    popped_bytes: AtomicU64,
}

impl ArenaStats {
    /// Allocate an id, build the cell, and register it.
    pub(crate) fn new(tag: String, start_pos: u64) -> Arc<Self> {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let stats = Arc::new(Self {
            id,
            tag,
            current: AtomicU64::new(start_pos),
            peak: AtomicU64::new(start_pos),
            pushes: AtomicU64::new(0),
            pops: AtomicU64::new(0),
            pushed_bytes: AtomicU64::new(0),
            popped_bytes: AtomicU64::new(0),
        });
        registry()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&stats));
        stats
    }

    pub(crate) fn id(&self) -> u32 {
        self.id
    }

    pub(crate) fn tag(&self) -> &str {
        &self.tag
    }

    pub(crate) fn record_push(&self, aligned_bytes: u64, pos: u64) {
        self.current.store(pos, Ordering::Relaxed);
        self.peak.fetch_max(pos, Ordering::Relaxed);
        self.pushes.fetch_add(1, Ordering::Relaxed);
        self.pushed_bytes.fetch_add(aligned_bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_pop(&self, released_bytes: u64, pos: u64) {
        self.current.store(pos, Ordering::Relaxed);
        self.pops.fetch_add(1, Ordering::Relaxed);
        self.popped_bytes.fetch_add(released_bytes, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ArenaMetrics {
        ArenaMetrics {
            id: self.id,
            tag: self.tag.clone(),
            current_usage: self.current.load(Ordering::Relaxed),
            peak_usage: self.peak.load(Ordering::Relaxed),
            push_operations: self.pushes.load(Ordering::Relaxed),
            pop_operations: self.pops.load(Ordering::Relaxed),
            total_pushed_bytes: self.pushed_bytes.load(Ordering::Relaxed),
            total_popped_bytes: self.popped_bytes.load(Ordering::Relaxed),
        }
    }
}

type Registry = Mutex<IndexMap<u32, Arc<ArenaStats>>>;

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(IndexMap::new()))
}

/// Drop an arena's cell from the registry. Called from `Arena::drop`.
pub(crate) fn unregister(id: u32) {
    registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .shift_remove(&id);
}

/// Metrics for every live arena, in creation order.
pub fn registry_snapshot() -> Vec<ArenaMetrics> {
    registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .values()
        .map(|stats| stats.snapshot())
        .collect()
}

/// Emit one `tracing` info event per live arena.
pub fn dump_registry() {
    for metrics in registry_snapshot() {
        tracing::info!(
            id = metrics.id,
            tag = %metrics.tag,
            current = metrics.current_usage,
            peak = metrics.peak_usage,
            pushes = metrics.push_operations,
            pops = metrics.pop_operations,
            pushed_bytes = metrics.total_pushed_bytes,
            popped_bytes = metrics.total_popped_bytes,
            "arena registry entry"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_in_creation_order() {
        let a = ArenaStats::new("a".to_string(), 64);
        let b = ArenaStats::new("b".to_string(), 64);
        assert!(b.id() > a.id());
        unregister(a.id());
        unregister(b.id());
    }

    #[test]
    fn push_and_pop_update_the_snapshot() {
        let stats = ArenaStats::new("counters".to_string(), 64);
        stats.record_push(128, 192);
        stats.record_push(64, 256);
        stats.record_pop(192, 64);

        let snap = stats.snapshot();
        assert_eq!(snap.current_usage, 64);
        assert_eq!(snap.peak_usage, 256);
        assert_eq!(snap.push_operations, 2);
        assert_eq!(snap.pop_operations, 1);
        assert_eq!(snap.total_pushed_bytes, 192);
        assert_eq!(snap.total_popped_bytes, 192);
        unregister(stats.id());
    }

    #[test]
    fn registry_holds_cells_until_unregistered() {
        let stats = ArenaStats::new("registered".to_string(), 64);
        let id = stats.id();
        assert!(registry_snapshot().iter().any(|m| m.id == id));
        unregister(id);
        assert!(!registry_snapshot().iter().any(|m| m.id == id));
    }

    #[test]
    fn peak_never_decreases() {
        let stats = ArenaStats::new("peak".to_string(), 64);
        stats.record_push(1000, 1064);
        stats.record_pop(1000, 64);
        stats.record_push(8, 72);
        assert_eq!(stats.snapshot().peak_usage, 1064);
        unregister(stats.id());
    }
}
