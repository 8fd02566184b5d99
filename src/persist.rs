//! Persistent Store Module
//!
//! Boundary contract for the durable key→record store behind the cache.
//! The cache-aside flow only needs three operations, so the trait stays
//! that small; real database bootstrap lives outside this crate. The
//! crate ships `MemoryStore`, an in-process implementation backing the
//! binary and the tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

// == Persistent Record ==
/// One durable record per key; the source of truth once the cache has
/// evicted or never held the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentRecord {
    /// The record's key
    pub key: String,
    /// The stored payload
    pub data: String,
}

// == Persistent Store Trait ==
/// Durable key→record store consulted on cache misses.
///
/// Implementations report I/O failures as `StoreFailure`; an absent key
/// is not an error at this layer.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Fetches the record for `key`, or `None` when absent.
    async fn find_one(&self, key: &str) -> Result<Option<PersistentRecord>>;

    /// Writes a record for `key`; called when a key is first generated.
    async fn insert(&self, key: &str, data: &str) -> Result<()>;

    /// Replaces the data for `key`, returning the number of records
    /// modified. Zero means the key was absent; the orchestrator decides
    /// whether that is an error.
    async fn update(&self, key: &str, data: &str) -> Result<u64>;
}

// == Memory Store ==
/// In-process `PersistentStore` backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .map(|records| records.len())
            .unwrap_or(0)
    }

    /// Returns true when no records are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn find_one(&self, key: &str) -> Result<Option<PersistentRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| CacheError::StoreFailure("record store lock poisoned".into()))?;

        Ok(records.get(key).map(|data| PersistentRecord {
            key: key.to_string(),
            data: data.clone(),
        }))
    }

    async fn insert(&self, key: &str, data: &str) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| CacheError::StoreFailure("record store lock poisoned".into()))?;

        records.insert(key.to_string(), data.to_string());
        Ok(())
    }

    async fn update(&self, key: &str, data: &str) -> Result<u64> {
        let mut records = self
            .records
            .write()
            .map_err(|_| CacheError::StoreFailure("record store lock poisoned".into()))?;

        match records.get_mut(key) {
            Some(existing) => {
                *existing = data.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
