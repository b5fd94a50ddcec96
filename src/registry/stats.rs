//! Registry Statistics Module
//!
//! Tracks registry activity: hits, entry creations, setup runs and removals.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Counters ==
/// Lock-free counters updated by the registry.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: AtomicU64,
    created: AtomicU64,
    setups_run: AtomicU64,
    setup_failures: AtomicU64,
    removed: AtomicU64,
    swept: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_created(&self, setup_ran: bool) {
        self.created.fetch_add(1, Ordering::Relaxed);
        if setup_ran {
            self.setups_run.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_setup_failure(&self) {
        self.setup_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_removed(&self, count: usize) {
        self.removed.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_swept(&self, count: usize) {
        self.swept.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.created.store(0, Ordering::Relaxed);
        self.setups_run.store(0, Ordering::Relaxed);
        self.setup_failures.store(0, Ordering::Relaxed);
        self.removed.store(0, Ordering::Relaxed);
        self.swept.store(0, Ordering::Relaxed);
    }

    /// Copies the counters into a snapshot with the given sizes.
    pub(crate) fn snapshot(&self, cache_types: usize, entries: usize) -> RegistryStats {
        RegistryStats {
            cache_types,
            entries,
            hits: self.hits.load(Ordering::Relaxed),
            created: self.created.load(Ordering::Relaxed),
            setups_run: self.setups_run.load(Ordering::Relaxed),
            setup_failures: self.setup_failures.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
        }
    }
}

// == Registry Stats ==
/// Point-in-time snapshot of registry activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Number of distinct cache types ever requested since the last clear
    pub cache_types: usize,
    /// Current number of initialized entries across all cache types
    pub entries: usize,
    /// Lookups that found an existing entry
    pub hits: u64,
    /// Entries created
    pub created: u64,
    /// Setup callbacks that ran to completion
    pub setups_run: u64,
    /// Fallible setup callbacks that returned an error
    pub setup_failures: u64,
    /// Entries removed explicitly
    pub removed: u64,
    /// Entries purged because their carrier was dropped
    pub swept: u64,
}

impl RegistryStats {
    // == Hit Rate ==
    /// Fraction of get/set calls served by an existing entry.
    ///
    /// Returns hits / (hits + created), or 0.0 if nothing was requested.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.created;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
