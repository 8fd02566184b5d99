//! Cache Module
//!
//! Bounded in-memory caching with per-key TTL, explicit insertion order
//! and an eviction listener hook. The store itself never picks eviction
//! victims; that policy lives in the orchestrator.

mod entry;
mod event;
mod order;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use event::{EvictionListener, EvictionReason, NoopListener};
pub use order::InsertionOrder;
pub use stats::CacheStats;
pub use store::{CacheStore, Lookup};

use crate::error::{CacheError, Result};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

// == Validation ==
/// Rejects empty or oversized keys.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("key must not be empty".into()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

/// Rejects oversized values.
pub(crate) fn validate_value(value: &str) -> Result<()> {
    if value.len() > MAX_VALUE_SIZE {
        return Err(CacheError::InvalidRequest(format!(
            "value exceeds maximum size of {} bytes",
            MAX_VALUE_SIZE
        )));
    }
    Ok(())
}
