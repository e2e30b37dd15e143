use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Cross-replica accounting of active swarmlist entries.
///
/// A host running many replicas in one process hands a clone of the same
/// census to each of them. Every replica publishes a delta whenever its own
/// active count moves, and withdraws its whole contribution when dropped, so
/// `total_active` is the live sum over all replicas sharing the handle.
///
/// The counter is atomic: a single-threaded driver needs no further care,
/// and a multi-threaded host gets correct sums for free.
#[derive(Clone, Debug, Default)]
pub struct SwarmCensus {
    total_active: Arc<AtomicU64>,
}

impl SwarmCensus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of active entries over every replica sharing this census.
    pub fn total_active(&self) -> u64 {
        self.total_active.load(Ordering::Relaxed)
    }

    pub(crate) fn add(&self, count: u64) {
        self.total_active.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn sub(&self, count: u64) {
        self.total_active.fetch_sub(count, Ordering::Relaxed);
    }
}
