//! Cache Statistics Module
//!
//! Tracks cache performance metrics: hits, misses, capacity evictions and
//! TTL expirations. Hits and misses are counted at the orchestrator's probe
//! (`lookup`), removals at the moment of removal, so no path double-counts.

// == Cache Stats ==
/// Cache performance counters.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of fresh-entry retrievals
    pub hits: u64,
    /// Number of failed retrievals (key absent or entry lapsed)
    pub misses: u64,
    /// Number of entries removed by the capacity eviction policy
    pub evictions: u64,
    /// Number of entries pruned because their TTL lapsed
    pub expirations: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Expiration ==
    /// Increments the expiration counter.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
