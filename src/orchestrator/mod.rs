//! Cache Orchestrator Module
//!
//! The core of the cache-aside flow: resolves reads through the cache,
//! the persistent store and the value generator in that order, owns the
//! capacity-eviction policy, and serializes same-key operations so a
//! concurrent miss cannot generate twice.
//!
//! The orchestrator holds no cached state of its own; the cache store and
//! the persistent store own theirs, and the only orchestrator-local state
//! is the per-key lock registry.

mod keylock;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, error, warn};

use crate::cache::{CacheStats, CacheStore, Lookup};
use crate::error::{CacheError, Result};
use crate::generator::ValueGenerator;
use crate::persist::PersistentStore;
use keylock::KeyLocks;

// == Cached Item ==
/// A key with its current value, as resolved by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedItem {
    /// The requested key
    pub key: String,
    /// The resolved value
    pub value: String,
}

impl CachedItem {
    fn new(key: &str, value: String) -> Self {
        Self {
            key: key.to_string(),
            value,
        }
    }
}

// == Cache Orchestrator ==
/// Coordinates the cache store, the persistent store and the generator.
pub struct CacheOrchestrator {
    /// The bounded in-memory store
    cache: Arc<RwLock<CacheStore>>,
    /// Durable source of truth behind the cache
    store: Arc<dyn PersistentStore>,
    /// Source of values for unseen keys
    generator: Arc<dyn ValueGenerator>,
    /// Same-key serialization
    locks: KeyLocks,
    /// Deadline applied to every suspending call
    op_timeout: Duration,
}

impl CacheOrchestrator {
    // == Constructor ==
    /// Creates an orchestrator over the given collaborators.
    ///
    /// `op_timeout` bounds every suspending call (per-key lock waits and
    /// persistent store I/O); on expiry the operation fails with
    /// `DeadlineExceeded` instead of silently abandoning a partial write.
    pub fn new(
        cache: Arc<RwLock<CacheStore>>,
        store: Arc<dyn PersistentStore>,
        generator: Arc<dyn ValueGenerator>,
        op_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            store,
            generator,
            locks: KeyLocks::new(),
            op_timeout,
        }
    }

    // == Get ==
    /// Resolves `key` to a value, creating one if nobody has seen it.
    ///
    /// Four terminal states: a fresh cache hit is touched (sliding
    /// expiration) and returned; a lapsed entry is regenerated in place;
    /// a miss with a persistent record caches and returns that record;
    /// a miss unknown to both layers generates a value, persists it, then
    /// caches it. The persistent store is authoritative: generation only
    /// happens for keys unseen by both layers.
    pub async fn get(&self, key: &str) -> Result<CachedItem> {
        let lock = self.locks.acquire(key);
        let _guard = self.deadline(lock.lock_owned()).await?;

        let probe = {
            let mut cache = self.cache.write().await;
            let probe = cache.lookup(key);
            if let Lookup::Hit(entry) = &probe {
                cache.touch(key);
                debug!(key, "cache hit");
                return Ok(CachedItem::new(key, entry.value.clone()));
            }
            probe
        };

        match probe {
            Lookup::Stale(_) => {
                debug!(key, "cache entry lapsed, regenerating");
                self.regenerate(key).await
            }
            _ => self.load_or_create(key).await,
        }
    }

    // == Update ==
    /// Explicitly regenerates the value for `key`.
    ///
    /// Generates a new value, writes it to the persistent store, then to
    /// the cache (TTL reset). Fails with `UpdateFailed` when the
    /// persistent store has no record for the key, in which case the
    /// cache is not mutated.
    pub async fn update(&self, key: &str) -> Result<CachedItem> {
        let lock = self.locks.acquire(key);
        let _guard = self.deadline(lock.lock_owned()).await?;

        self.regenerate(key).await
    }

    // == Set ==
    /// Writes a value into the cache, evicting to make room if needed.
    ///
    /// On `CapacityExceeded` the eviction policy frees exactly one slot
    /// and the insert is retried exactly once; a second failure (capacity
    /// zero) surfaces to the caller. The whole check-evict-retry sequence
    /// runs under one write guard, so concurrent inserts can neither
    /// evict twice nor overshoot capacity.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut cache = self.cache.write().await;
        match cache.set(key, value) {
            Err(CacheError::CapacityExceeded(_)) => {
                evict_one(&mut cache);
                cache.set(key, value)
            }
            result => result,
        }
    }

    // == Get All ==
    /// The full cache-resident mapping key→value.
    ///
    /// Never consults the persistent store and never generates; lapsed
    /// entries encountered along the way are pruned, not returned.
    pub async fn get_all(&self) -> HashMap<String, String> {
        let mut cache = self.cache.write().await;
        let keys = cache.list_keys();
        cache.multi_get(&keys)
    }

    // == Clear ==
    /// Empties the cache, returning the count removed. Persistent records
    /// are untouched.
    pub async fn clear(&self) -> usize {
        let removed = self.cache.write().await.delete_all();
        debug!(removed, "cache cleared");
        removed
    }

    // == Delete One ==
    /// Removes a single key from the cache; 1 if it was resident, else 0.
    /// The persistent record survives, so the key's value outlives cache
    /// pressure.
    pub async fn delete_one(&self, key: &str) -> Result<usize> {
        let lock = self.locks.acquire(key);
        let _guard = self.deadline(lock.lock_owned()).await?;

        Ok(self.cache.write().await.delete(key))
    }

    // == Stats ==
    /// Snapshot of the cache's performance counters.
    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    // == Internals ==
    /// Miss path: persistent record if one exists, otherwise generate,
    /// persist, cache.
    async fn load_or_create(&self, key: &str) -> Result<CachedItem> {
        match self.store_call(self.store.find_one(key)).await? {
            Some(record) => {
                debug!(key, "cache miss, loaded persistent record");
                self.set(key, &record.data).await?;
                Ok(CachedItem::new(key, record.data))
            }
            None => {
                let value = self.generator.generate()?;
                debug!(key, "unseen key, generated new value");
                self.store_call(self.store.insert(key, &value)).await?;
                self.set(key, &value).await?;
                Ok(CachedItem::new(key, value))
            }
        }
    }

    /// Shared by `update` and the lapsed-hit path of `get`. The caller
    /// holds the per-key lock.
    async fn regenerate(&self, key: &str) -> Result<CachedItem> {
        let value = self.generator.generate()?;
        let modified = self.store_call(self.store.update(key, &value)).await?;
        if modified == 0 {
            warn!(key, "regeneration target has no persistent record");
            return Err(CacheError::UpdateFailed(key.to_string()));
        }
        self.set(key, &value).await?;
        Ok(CachedItem::new(key, value))
    }

    /// Persistent store call with the deadline applied; store failures
    /// are logged here before propagating.
    async fn store_call<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        self.deadline(call).await?.map_err(|err| {
            if matches!(err, CacheError::StoreFailure(_)) {
                error!(error = %err, "persistent store failure");
            }
            err
        })
    }

    /// Bounds a suspending call by the configured deadline.
    async fn deadline<T>(&self, fut: impl Future<Output = T>) -> Result<T> {
        timeout(self.op_timeout, fut)
            .await
            .map_err(|_| CacheError::DeadlineExceeded(self.op_timeout))
    }
}

// == Eviction Policy ==
/// Frees exactly one slot: the first lapsed entry in enumeration order,
/// or failing that the first entry unconditionally.
fn evict_one(cache: &mut CacheStore) {
    let keys = cache.list_keys();
    for key in &keys {
        if cache.prune_expired(key) {
            debug!(key = key.as_str(), "eviction policy pruned lapsed entry");
            return;
        }
    }
    if let Some(oldest) = keys.first() {
        debug!(key = oldest.as_str(), "no lapsed entries, evicted oldest");
        cache.evict(oldest);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use crate::persist::{MemoryStore, PersistentRecord};

    const TTL: Duration = Duration::from_secs(300);
    const OP_TIMEOUT: Duration = Duration::from_secs(5);

    /// Generator that numbers its outputs and counts invocations.
    #[derive(Default)]
    struct CountingGenerator {
        calls: AtomicUsize,
    }

    impl ValueGenerator for CountingGenerator {
        fn generate(&self) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("generated-{}", n))
        }
    }

    impl CountingGenerator {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    /// Persistent store that counts lookups on top of a plain map.
    #[derive(Default)]
    struct TrackingStore {
        records: StdMutex<HashMap<String, String>>,
        finds: AtomicUsize,
    }

    impl TrackingStore {
        fn seeded(key: &str, data: &str) -> Self {
            let store = Self::default();
            store
                .records
                .lock()
                .unwrap()
                .insert(key.to_string(), data.to_string());
            store
        }

        fn finds(&self) -> usize {
            self.finds.load(Ordering::SeqCst)
        }

        fn record(&self, key: &str) -> Option<String> {
            self.records.lock().unwrap().get(key).cloned()
        }
    }

    #[async_trait]
    impl PersistentStore for TrackingStore {
        async fn find_one(&self, key: &str) -> Result<Option<PersistentRecord>> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            Ok(self.record(key).map(|data| PersistentRecord {
                key: key.to_string(),
                data,
            }))
        }

        async fn insert(&self, key: &str, data: &str) -> Result<()> {
            self.records
                .lock()
                .unwrap()
                .insert(key.to_string(), data.to_string());
            Ok(())
        }

        async fn update(&self, key: &str, data: &str) -> Result<u64> {
            match self.records.lock().unwrap().get_mut(key) {
                Some(existing) => {
                    *existing = data.to_string();
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }

    /// Store whose every call outlasts any reasonable deadline.
    struct SlowStore {
        delay: Duration,
    }

    #[async_trait]
    impl PersistentStore for SlowStore {
        async fn find_one(&self, _key: &str) -> Result<Option<PersistentRecord>> {
            tokio::time::sleep(self.delay).await;
            Ok(None)
        }

        async fn insert(&self, _key: &str, _data: &str) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }

        async fn update(&self, _key: &str, _data: &str) -> Result<u64> {
            tokio::time::sleep(self.delay).await;
            Ok(0)
        }
    }

    fn build(
        capacity: usize,
        ttl: Duration,
        store: Arc<dyn PersistentStore>,
        generator: Arc<dyn ValueGenerator>,
    ) -> (CacheOrchestrator, Arc<RwLock<CacheStore>>) {
        let cache = Arc::new(RwLock::new(CacheStore::new(capacity, ttl)));
        let orchestrator = CacheOrchestrator::new(cache.clone(), store, generator, OP_TIMEOUT);
        (orchestrator, cache)
    }

    #[tokio::test]
    async fn test_get_unseen_key_generates_and_persists() {
        let store = Arc::new(TrackingStore::default());
        let generator = Arc::new(CountingGenerator::default());
        let (orch, _) = build(100, TTL, store.clone(), generator.clone());

        let item = orch.get("fresh").await.unwrap();

        assert_eq!(item.key, "fresh");
        assert_eq!(item.value, "generated-0");
        assert_eq!(generator.calls(), 1);
        assert_eq!(store.record("fresh").unwrap(), "generated-0");
    }

    #[tokio::test]
    async fn test_get_is_idempotent_within_ttl() {
        let store = Arc::new(TrackingStore::default());
        let generator = Arc::new(CountingGenerator::default());
        let (orch, _) = build(100, TTL, store, generator.clone());

        let first = orch.get("key1").await.unwrap();
        let second = orch.get("key1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_get_prefers_persistent_record_over_generation() {
        let store = Arc::new(TrackingStore::seeded("known", "durable-value"));
        let generator = Arc::new(CountingGenerator::default());
        let (orch, _) = build(100, TTL, store.clone(), generator.clone());

        let item = orch.get("known").await.unwrap();

        assert_eq!(item.value, "durable-value");
        assert_eq!(generator.calls(), 0, "database is authoritative");
        assert_eq!(store.finds(), 1);

        // Now cache-resident: the second get never reconsults the store
        let again = orch.get("known").await.unwrap();
        assert_eq!(again.value, "durable-value");
        assert_eq!(store.finds(), 1);
    }

    #[tokio::test]
    async fn test_get_lapsed_entry_regenerates_and_updates_record() {
        let store = Arc::new(TrackingStore::default());
        let generator = Arc::new(CountingGenerator::default());
        let (orch, cache) = build(100, TTL, store.clone(), generator.clone());

        let first = orch.get("key1").await.unwrap();
        cache.write().await.force_expire("key1");

        let second = orch.get("key1").await.unwrap();

        assert_ne!(second.value, first.value);
        assert_eq!(generator.calls(), 2);
        assert_eq!(store.record("key1").unwrap(), second.value);

        // Regeneration refreshed the TTL: the entry is fresh again
        let third = orch.get("key1").await.unwrap();
        assert_eq!(third, second);
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_update_without_record_fails_and_leaves_cache_alone() {
        let store = Arc::new(TrackingStore::default());
        let generator = Arc::new(CountingGenerator::default());
        let (orch, cache) = build(100, TTL, store, generator);

        // Resident entry written around the persistent store
        cache.write().await.set("orphan", "resident").unwrap();

        let result = orch.update("orphan").await;
        assert!(matches!(result, Err(CacheError::UpdateFailed(_))));

        let entry = cache.write().await.get("orphan").unwrap();
        assert_eq!(entry.value, "resident");
    }

    #[tokio::test]
    async fn test_update_regenerates_existing_record() {
        let store = Arc::new(TrackingStore::seeded("key1", "old"));
        let generator = Arc::new(CountingGenerator::default());
        let (orch, _) = build(100, TTL, store.clone(), generator);

        let item = orch.update("key1").await.unwrap();

        assert_eq!(item.value, "generated-0");
        assert_eq!(store.record("key1").unwrap(), "generated-0");

        // The fresh value is now cache-resident
        let got = orch.get("key1").await.unwrap();
        assert_eq!(got.value, "generated-0");
        assert_eq!(store.finds(), 0);
    }

    #[tokio::test]
    async fn test_set_never_exceeds_capacity() {
        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(CountingGenerator::default());
        let (orch, cache) = build(3, TTL, store, generator);

        for i in 0..10 {
            orch.set(&format!("key{}", i), "value").await.unwrap();
            assert!(cache.read().await.len() <= 3);
        }
        assert_eq!(cache.read().await.len(), 3);
    }

    #[tokio::test]
    async fn test_eviction_prefers_lapsed_entries() {
        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(CountingGenerator::default());
        let (orch, cache) = build(2, TTL, store, generator);

        orch.set("fresh", "v1").await.unwrap();
        orch.set("lapsed", "v2").await.unwrap();
        cache.write().await.force_expire("lapsed");

        orch.set("incoming", "v3").await.unwrap();

        let resident = orch.get_all().await;
        assert_eq!(resident.len(), 2);
        assert!(resident.contains_key("fresh"), "fresh entry must survive");
        assert!(resident.contains_key("incoming"));
        assert_eq!(cache.read().await.stats().expirations, 1);
    }

    #[tokio::test]
    async fn test_eviction_falls_back_to_oldest() {
        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(CountingGenerator::default());
        let (orch, cache) = build(1, TTL, store, generator);

        orch.get("a").await.unwrap();
        orch.get("b").await.unwrap();

        let resident = orch.get_all().await;
        assert_eq!(resident.len(), 1);
        assert!(resident.contains_key("b"), "a was evicted to admit b");
        assert_eq!(cache.read().await.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_set_with_zero_capacity_is_fatal() {
        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(CountingGenerator::default());
        let (orch, _) = build(0, TTL, store, generator);

        let result = orch.set("key1", "value").await;
        assert!(matches!(result, Err(CacheError::CapacityExceeded(0))));
    }

    #[tokio::test]
    async fn test_get_all_exposes_only_resident_entries() {
        let store = Arc::new(TrackingStore::seeded("persisted-only", "hidden"));
        let generator = Arc::new(CountingGenerator::default());
        let (orch, _) = build(100, TTL, store.clone(), generator.clone());

        orch.get("a").await.unwrap();
        orch.get("b").await.unwrap();
        let finds_before = store.finds();

        let all = orch.get_all().await;

        assert_eq!(all.len(), 2);
        assert!(!all.contains_key("persisted-only"));
        assert_eq!(store.finds(), finds_before, "get_all must not consult the store");
        assert_eq!(generator.calls(), 2, "get_all must not generate");
    }

    #[tokio::test]
    async fn test_clear_counts_and_spares_persistent_records() {
        let store = Arc::new(TrackingStore::default());
        let generator = Arc::new(CountingGenerator::default());
        let (orch, _) = build(100, TTL, store.clone(), generator);

        orch.get("a").await.unwrap();
        orch.get("b").await.unwrap();
        orch.get("c").await.unwrap();

        assert_eq!(orch.clear().await, 3);
        assert!(orch.get_all().await.is_empty());
        assert!(store.record("a").is_some(), "clear only touches the cache");
        assert_eq!(orch.clear().await, 0);
    }

    #[tokio::test]
    async fn test_delete_one_counts_and_spares_record() {
        let store = Arc::new(TrackingStore::default());
        let generator = Arc::new(CountingGenerator::default());
        let (orch, _) = build(100, TTL, store.clone(), generator);

        orch.get("key1").await.unwrap();

        assert_eq!(orch.delete_one("key1").await.unwrap(), 1);
        assert_eq!(orch.delete_one("key1").await.unwrap(), 0);
        assert!(store.record("key1").is_some());
    }

    #[tokio::test]
    async fn test_deleted_key_reloads_from_persistent_record() {
        let store = Arc::new(TrackingStore::default());
        let generator = Arc::new(CountingGenerator::default());
        let (orch, _) = build(100, TTL, store, generator.clone());

        let first = orch.get("key1").await.unwrap();
        orch.delete_one("key1").await.unwrap();

        let second = orch.get("key1").await.unwrap();

        assert_eq!(second.value, first.value, "record survived the cache delete");
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_same_key_gets_generate_once() {
        let store = Arc::new(TrackingStore::default());
        let generator = Arc::new(CountingGenerator::default());
        let (orch, _) = build(100, TTL, store, generator.clone());
        let orch = Arc::new(orch);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let orch = orch.clone();
                tokio::spawn(async move { orch.get("contested").await.unwrap() })
            })
            .collect();

        let mut values = Vec::new();
        for task in tasks {
            values.push(task.await.unwrap().value);
        }

        assert_eq!(generator.calls(), 1, "same-key misses must single-flight");
        assert!(values.iter().all(|v| v == &values[0]));
    }

    #[tokio::test]
    async fn test_slow_store_hits_the_deadline() {
        let store = Arc::new(SlowStore {
            delay: Duration::from_millis(200),
        });
        let generator = Arc::new(CountingGenerator::default());
        let cache = Arc::new(RwLock::new(CacheStore::new(100, TTL)));
        let orch = CacheOrchestrator::new(
            cache,
            store,
            generator,
            Duration::from_millis(20),
        );

        let result = orch.get("key1").await;
        assert!(matches!(result, Err(CacheError::DeadlineExceeded(_))));
    }

    #[tokio::test]
    async fn test_regeneration_scenario_ttl_two_capacity_two() {
        // TTL-expiry walkthrough with a sub-second clock
        let store = Arc::new(TrackingStore::default());
        let generator = Arc::new(CountingGenerator::default());
        let (orch, _) = build(2, Duration::from_millis(40), store.clone(), generator);

        let a1 = orch.get("a").await.unwrap();
        let b1 = orch.get("b").await.unwrap();
        assert_ne!(a1.value, b1.value);

        tokio::time::sleep(Duration::from_millis(60)).await;

        let a2 = orch.get("a").await.unwrap();
        assert_eq!(store.record("a").unwrap(), a2.value);
        assert_ne!(a2.value, a1.value);
    }
}
