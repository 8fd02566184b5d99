//! Cache Entry Module
//!
//! Defines the structure for individual cache entries. Every entry carries
//! an absolute expiry timestamp; the store refreshes it on writes and on
//! sliding-expiration touches.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A single cached value with its expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` from now.
    pub fn new(value: String, ttl: Duration) -> Self {
        let now = current_timestamp_ms();
        Self {
            value,
            created_at: now,
            expires_at: now + ttl.as_millis() as u64,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired when the current time is
    /// greater than or equal to the expiration time, so the instant the TTL
    /// duration has fully elapsed the entry is treated as absent.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Refresh ==
    /// Pushes the expiry out to the full `ttl` from now (sliding expiration).
    /// The value and creation timestamp are untouched.
    pub fn refresh(&mut self, ttl: Duration) {
        self.expires_at = current_timestamp_ms() + ttl.as_millis() as u64;
    }

    // == Remaining TTL ==
    /// Returns the time left before expiry, or `None` once it has lapsed.
    pub fn remaining(&self) -> Option<Duration> {
        let now = current_timestamp_ms();
        (self.expires_at > now).then(|| Duration::from_millis(self.expires_at - now))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
