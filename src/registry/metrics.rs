//! Lookup counters for a [`CascadingResolver`](super::CascadingResolver).

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, updated lock-free on every lookup.
#[derive(Debug, Default)]
pub struct ResolverMetrics {
    fast_path_hits: AtomicU64,
    fast_path_misses: AtomicU64,
    cascades: AtomicU64,
    cascade_wins: AtomicU64,
    exhausted: AtomicU64,
}

impl ResolverMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_fast_path_hit(&self) {
        self.fast_path_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fast_path_miss(&self) {
        self.fast_path_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cascade(&self) {
        self.cascades.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cascade_win(&self) {
        self.cascade_wins.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> ResolverMetricsSnapshot {
        ResolverMetricsSnapshot {
            fast_path_hits: self.fast_path_hits.load(Ordering::Relaxed),
            fast_path_misses: self.fast_path_misses.load(Ordering::Relaxed),
            cascades: self.cascades.load(Ordering::Relaxed),
            cascade_wins: self.cascade_wins.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
        }
    }
}

/// Serializable view of [`ResolverMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverMetricsSnapshot {
    /// Lookups answered by the active provider without cascading
    pub fast_path_hits: u64,

    /// Lookups where the active provider failed and the slot was cleared
    pub fast_path_misses: u64,

    /// Full passes over the provider sequence
    pub cascades: u64,

    /// Cascades that found a provider
    pub cascade_wins: u64,

    /// Cascades that ran out of providers
    pub exhausted: u64,
}

impl ResolverMetricsSnapshot {
    /// Share of lookups served from the fast path, in `0.0..=1.0`.
    pub fn fast_path_ratio(&self) -> f64 {
        let lookups = self.fast_path_hits + self.cascades;
        if lookups == 0 {
            return 0.0;
        }
        self.fast_path_hits as f64 / lookups as f64
    }
}
