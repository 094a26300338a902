//! Strongly-typed identifiers for grids and kernel entry points.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Counter for unique [`GridId`] allocation.
static GRID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Counter for unique [`EntryUid`] allocation.
static ENTRY_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Identifies one launched grid.
///
/// Allocated from a monotonic atomic counter via [`GridId::next`], so
/// grids built later always compare greater than grids built earlier
/// within the same process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridId(pub u64);

impl GridId {
    /// Allocate a fresh, unique grid ID. Thread-safe.
    pub fn next() -> Self {
        Self(GRID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for GridId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Unique per-instance identifier for a [`KernelEntry`](crate::KernelEntry).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryUid(u32);

impl EntryUid {
    /// Allocate a fresh, unique entry ID. Thread-safe.
    pub fn next() -> Self {
        Self(ENTRY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntryUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_ids_are_monotonic() {
        let a = GridId::next();
        let b = GridId::next();
        assert!(b > a);
    }

    #[test]
    fn entry_uids_are_unique() {
        let a = EntryUid::next();
        let b = EntryUid::next();
        assert_ne!(a, b);
    }
}
