//! Cache Store Module
//!
//! Bounded in-memory key→entry map with per-key TTL, explicit insertion
//! order and an eviction listener hook.
//!
//! The store never evicts on its own: inserting a new key at capacity fails
//! with `CapacityExceeded` and the caller decides which entry to sacrifice
//! via `evict`. Lapsed entries are treated as absent and are pruned as soon
//! as a read path detects them (passive expiry), freeing a capacity slot.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{
    validate_key, validate_value, CacheEntry, CacheStats, EvictionListener, EvictionReason,
    InsertionOrder, NoopListener,
};
use crate::error::{CacheError, Result};

// == Lookup Outcome ==
/// Tri-state result of probing the store for a key.
///
/// `Stale` hands the lapsed entry back without pruning it, so the caller
/// owns its fate: the regeneration path overwrites it in place, while the
/// plain read path (`get`) prunes on sight instead.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// Resident and fresh; counted as a hit.
    Hit(CacheEntry),
    /// Resident but the TTL has lapsed; counted as a miss.
    Stale(CacheEntry),
    /// Not resident; counted as a miss.
    Miss,
}

// == Cache Store ==
/// Bounded cache storage with TTL expiry and FIFO enumeration order.
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Arrival-order tracker backing `list_keys`
    order: InsertionOrder,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Time-to-live applied to every entry
    ttl: Duration,
    /// Hook fired when the store drops an entry
    listener: Arc<dyn EvictionListener>,
}

impl CacheStore {
    // == Constructors ==
    /// Creates a new CacheStore with the given capacity and TTL.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_listener(capacity, ttl, Arc::new(NoopListener))
    }

    /// Creates a new CacheStore that reports drops to `listener`.
    pub fn with_listener(
        capacity: usize,
        ttl: Duration,
        listener: Arc<dyn EvictionListener>,
    ) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(),
            capacity,
            ttl,
            listener,
        }
    }

    // == Lookup ==
    /// Probes for a key without side effects on TTL or residency.
    ///
    /// This is the single hit/miss counting point: `Hit` records a hit,
    /// `Stale` and `Miss` record a miss.
    pub fn lookup(&mut self, key: &str) -> Lookup {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.stats.record_miss();
                Lookup::Stale(entry.clone())
            }
            Some(entry) => {
                self.stats.record_hit();
                Lookup::Hit(entry.clone())
            }
            None => {
                self.stats.record_miss();
                Lookup::Miss
            }
        }
    }

    // == Get ==
    /// Plain read: the fresh entry for `key`, or `None`.
    ///
    /// A lapsed entry is treated as absent and pruned on detection. Does
    /// not reset the TTL and does not touch the hit/miss counters.
    pub fn get(&mut self, key: &str) -> Option<CacheEntry> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.remove_expired(key);
                None
            }
            Some(entry) => Some(entry.clone()),
            None => None,
        }
    }

    // == Set ==
    /// Inserts or overwrites an entry, resetting its TTL to the full
    /// duration.
    ///
    /// Fails with `CapacityExceeded` when the key is new and the store is
    /// full; the store never picks an eviction victim itself. Overwriting
    /// keeps the key's original enumeration position.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        validate_value(value)?;

        let is_new = !self.entries.contains_key(key);
        if is_new && self.entries.len() >= self.capacity {
            return Err(CacheError::CapacityExceeded(self.capacity));
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(value.to_string(), self.ttl));
        if is_new {
            self.order.record(key);
        }
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Touch ==
    /// Resets a fresh entry's TTL to the full duration without changing
    /// its value or enumeration position (sliding expiration).
    ///
    /// Returns false when the key is absent or already lapsed; a lapsed
    /// entry is not revived.
    pub fn touch(&mut self, key: &str) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.refresh(self.ttl);
                true
            }
            _ => false,
        }
    }

    // == Remaining TTL ==
    /// Time left before `key` expires; `None` when absent or lapsed.
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        self.entries.get(key).and_then(CacheEntry::remaining)
    }

    // == Delete ==
    /// Caller-initiated removal; returns the removed count (0 or 1).
    /// Does not fire the eviction listener.
    pub fn delete(&mut self, key: &str) -> usize {
        match self.entries.remove(key) {
            Some(_) => {
                self.order.remove(key);
                self.stats.set_total_entries(self.entries.len());
                1
            }
            None => 0,
        }
    }

    // == Delete All ==
    /// Removes every entry; returns the count. Does not fire the listener.
    pub fn delete_all(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
        removed
    }

    // == Evict ==
    /// Policy-initiated removal to free a capacity slot.
    ///
    /// Fires the listener with reason `Capacity` and bumps the eviction
    /// counter. Returns false if the key was not resident.
    pub fn evict(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.order.remove(key);
                self.stats.record_eviction();
                self.stats.set_total_entries(self.entries.len());
                self.listener.on_evict(key, &entry, EvictionReason::Capacity);
                true
            }
            None => false,
        }
    }

    // == List Keys ==
    /// All resident keys in insertion order (oldest first).
    pub fn list_keys(&self) -> Vec<String> {
        self.order.keys().cloned().collect()
    }

    // == Multi Get ==
    /// Mapping key→value for every fresh key in `keys`.
    ///
    /// Lapsed entries encountered along the way are pruned.
    pub fn multi_get(&mut self, keys: &[String]) -> HashMap<String, String> {
        let mut values = HashMap::new();
        for key in keys {
            match self.entries.get(key) {
                Some(entry) if entry.is_expired() => self.remove_expired(key),
                Some(entry) => {
                    values.insert(key.clone(), entry.value.clone());
                }
                None => {}
            }
        }
        values
    }

    // == Prune Expired ==
    /// Removes `key` only if its TTL has lapsed.
    ///
    /// Fires the listener with reason `Expired` and counts the expiration.
    /// Returns false when the key is absent or still fresh. The eviction
    /// policy uses this for its expired-first scan.
    pub fn prune_expired(&mut self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.remove_expired(key);
                true
            }
            _ => false,
        }
    }

    // == Purge Expired ==
    /// Removes all lapsed entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let lapsed: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &lapsed {
            self.remove_expired(key);
        }

        lapsed.len()
    }

    // == Accessors ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the configured maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Internals ==
    /// Prunes an entry whose TTL lapsed: fires the listener with reason
    /// `Expired` and counts the expiration.
    fn remove_expired(&mut self, key: &str) {
        if let Some(entry) = self.entries.remove(key) {
            self.order.remove(key);
            self.stats.record_expiration();
            self.stats.set_total_entries(self.entries.len());
            self.listener.on_evict(key, &entry, EvictionReason::Expired);
        }
    }

    /// Backdates an entry so tests can exercise expiry paths without
    /// sleeping.
    #[cfg(test)]
    pub(crate) fn force_expire(&mut self, key: &str) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = 0;
                true
            }
            None => false,
        }
    }
}
