//! Per-Key Lock Module
//!
//! Registry handing out one async mutex per key so that concurrent
//! operations on the same key run one at a time while distinct keys never
//! contend. Without this, two concurrent misses for the same key would
//! both generate and both persist, the second silently clobbering the
//! first.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;

// == Key Locks ==
/// One async mutex per in-flight key.
#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    // == Constructor ==
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // == Acquire ==
    /// Returns the mutex for `key`, creating it on first use.
    ///
    /// Entries whose mutex is no longer held by anyone outside the
    /// registry are dropped on the way, so the map tracks only keys with
    /// operations in flight.
    pub fn acquire(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("key lock registry poisoned");
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(key.to_string()).or_default())
    }

    // == Tracked ==
    /// Number of keys currently tracked.
    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        self.locks.lock().expect("key lock registry poisoned").len()
    }
}
