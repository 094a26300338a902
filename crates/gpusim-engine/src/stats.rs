//! Lock-free handoff counters shared between the host and the worker.
//!
//! The worker bumps `started` when it leaves Idle with a grid and
//! `finished` right before it raises the finish signal. The host may
//! read both at any time; under the single-flight discipline
//! `started <= finished + 1` always holds.

use std::sync::atomic::{AtomicU64, Ordering};

/// Start/finish signal counts for one session.
#[derive(Debug, Default)]
pub struct HandoffStats {
    started: AtomicU64,
    finished: AtomicU64,
    failed: AtomicU64,
}

// Compile-time assertion: HandoffStats must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<HandoffStats>();
};

impl HandoffStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the worker picked up a grid. Returns the new count.
    pub(crate) fn record_start(&self) -> u64 {
        self.started.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Record that the worker is about to signal finish.
    pub(crate) fn record_finish(&self, succeeded: bool) -> u64 {
        if !succeeded {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.finished.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Number of grids the worker has started.
    pub fn started(&self) -> u64 {
        self.started.load(Ordering::Acquire)
    }

    /// Number of finish signals the worker has raised.
    pub fn finished(&self) -> u64 {
        self.finished.load(Ordering::Acquire)
    }

    /// Number of finished grids whose simulation failed.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Whether a grid is currently between start and finish.
    pub fn in_flight(&self) -> bool {
        self.finished() < self.started()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let s = HandoffStats::new();
        assert_eq!(s.started(), 0);
        assert_eq!(s.finished(), 0);
        assert!(!s.in_flight());
    }

    #[test]
    fn start_then_finish() {
        let s = HandoffStats::new();
        assert_eq!(s.record_start(), 1);
        assert!(s.in_flight());
        assert_eq!(s.record_finish(true), 1);
        assert!(!s.in_flight());
        assert_eq!(s.failed(), 0);
    }

    #[test]
    fn failures_counted_separately() {
        let s = HandoffStats::new();
        s.record_start();
        s.record_finish(false);
        assert_eq!(s.finished(), 1);
        assert_eq!(s.failed(), 1);
    }
}
