//! Cache accounting.
//!
//! Each cache keeps its own counters in-process (read back through
//! [`CacheMetrics`]) and mirrors every increment to the `metrics` facade,
//! labelled with the cache name, so a Prometheus exporter installed by the
//! runtime can publish them.

/// Metric names emitted by every cache, labelled `cache = <name>`.
pub mod names {
    /// Lookups that reached the source
    pub const QUERIES: &str = "cache_queries_total";
    /// Lookups whose stored value matched the source
    pub const HITS: &str = "cache_hits_total";
    /// Lookups of a key not yet stored
    pub const COLD_MISSES: &str = "cache_cold_misses_total";
    /// Lookups whose stored value differed from the source
    pub const INCONSISTENCIES: &str = "cache_inconsistencies_total";
    /// Invalidation requests
    pub const INVALIDATIONS: &str = "cache_invalidations_total";
    /// Invalidation requests for an unknown correlation id
    pub const REDUNDANT_INVALIDATIONS: &str = "cache_redundant_invalidations_total";
    /// Entries evicted to make room
    pub const EVICTIONS: &str = "cache_evictions_total";
    /// Source failures
    pub const FETCH_FAILURES: &str = "cache_fetch_failures_total";
}

/// Point-in-time snapshot of a cache's counters.
///
/// Always satisfies `queries == hits + cold_misses + inconsistencies` and
/// `invalidations == redundant_invalidations + effective_invalidations()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    /// Successful lookups
    pub queries: u64,
    /// Stored value equal to fetched value
    pub hits: u64,
    /// Key was absent
    pub cold_misses: u64,
    /// Stored value differed from fetched value
    pub inconsistencies: u64,
    /// Invalidation requests
    pub invalidations: u64,
    /// Invalidations with no remembered key
    pub redundant_invalidations: u64,
    /// LRU evictions
    pub evictions: u64,
    /// Fetch strategy failures
    pub fetch_failures: u64,
}

impl CacheMetrics {
    /// Invalidations that found a remembered key
    #[must_use]
    pub const fn effective_invalidations(&self) -> u64 {
        self.invalidations - self.redundant_invalidations
    }

    /// Fraction of lookups answered consistently by the stored value
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_ratio(&self) -> f64 {
        if self.queries == 0 {
            0.0
        } else {
            self.hits as f64 / self.queries as f64
        }
    }
}

/// Increment a named counter for `cache` on the global recorder.
pub(crate) fn emit(name: &'static str, cache: &str) {
    metrics::counter!(name, "cache" => cache.to_string()).increment(1);
}
