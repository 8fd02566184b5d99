//! Insertion Order Module
//!
//! Tracks the order in which keys entered the cache. Enumeration (and the
//! eviction fallback that scans it) is therefore explicit FIFO rather than
//! whatever order the underlying map happens to iterate in. Overwrites and
//! TTL touches do not move a key.

use std::collections::VecDeque;

// == Insertion Order Tracker ==
/// Keys in arrival order: front = oldest, back = newest.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    order: VecDeque<String>,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record ==
    /// Registers a key at the back of the order.
    ///
    /// A key that is already tracked keeps its original position, so
    /// overwriting a cached value does not count as a fresh arrival.
    pub fn record(&mut self, key: &str) {
        if !self.contains(key) {
            self.order.push_back(key.to_string());
        }
    }

    // == Remove ==
    /// Drops a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Clear ==
    /// Drops every tracked key.
    pub fn clear(&mut self) {
        self.order.clear();
    }

    // == Keys ==
    /// Iterates keys oldest-first.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
