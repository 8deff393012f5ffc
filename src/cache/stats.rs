//! Mirror Statistics Module
//!
//! Counts how each script response was produced.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::cache::CacheStatus;

// == Mirror Stats ==
/// Lock-free outcome counters shared by all request handlers.
#[derive(Debug, Default)]
pub struct MirrorStats {
    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
    stale: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of [`MirrorStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub refreshes: u64,
    pub stale: u64,
    pub failures: u64,
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Share of script responses served from cache without origin contact.
    ///
    /// Returns 0.0 if no script requests have been handled.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.refreshes + self.stale + self.failures;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl MirrorStats {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Outcome ==
    /// Counts a served response by its cache status tag.
    pub fn record(&self, status: CacheStatus) {
        let counter = match status {
            CacheStatus::Hit => &self.hits,
            CacheStatus::Miss => &self.misses,
            CacheStatus::Refresh => &self.refreshes,
            CacheStatus::Stale => &self.stale,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Failure ==
    /// Counts a 502 response.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            stale: self.stale.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
