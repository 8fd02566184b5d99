//! Eviction Event Module
//!
//! Synchronous hook invoked by the store at the moment an entry is dropped,
//! so callers can react to removals without the store growing hidden
//! asynchronous side effects.

use crate::cache::CacheEntry;

// == Eviction Reason ==
/// Why the store dropped an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// The entry's TTL had lapsed and the store pruned it on detection.
    Expired,
    /// The eviction policy removed the entry to make room for an insert.
    Capacity,
}

// == Eviction Listener ==
/// Observer for store-initiated removals.
///
/// Caller-initiated deletes (`delete`, `delete_all`) are silent; only
/// expiry pruning and capacity evictions are reported. The listener runs
/// while the store is mutably borrowed, so it must not call back into the
/// store.
pub trait EvictionListener: Send + Sync {
    fn on_evict(&self, key: &str, entry: &CacheEntry, reason: EvictionReason);
}

/// Listener that ignores every event; the default at store construction.
#[derive(Debug, Default)]
pub struct NoopListener;

impl EvictionListener for NoopListener {
    fn on_evict(&self, _key: &str, _entry: &CacheEntry, _reason: EvictionReason) {}
}
