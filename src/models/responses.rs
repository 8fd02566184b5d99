//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies. The full-dump
//! endpoint (`GET /`) serializes a plain map and needs no DTO here.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::orchestrator::CachedItem;

/// Response body for item resolution (GET /item/:key, PUT /item/:key)
#[derive(Debug, Clone, Serialize)]
pub struct ItemResponse {
    /// The requested key
    pub key: String,
    /// The resolved value
    pub value: String,
}

impl From<CachedItem> for ItemResponse {
    fn from(item: CachedItem) -> Self {
        Self {
            key: item.key,
            value: item.value,
        }
    }
}

/// Response body for single-key deletion (DELETE /item/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteItemResponse {
    /// The key that was targeted
    pub key: String,
    /// 1 if the key was resident and removed, 0 otherwise
    pub removed: usize,
}

impl DeleteItemResponse {
    /// Creates a new DeleteItemResponse
    pub fn new(key: impl Into<String>, removed: usize) -> Self {
        Self {
            key: key.into(),
            removed,
        }
    }
}

/// Response body for the clear operation (DELETE /)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Number of cache entries removed
    pub deleted: usize,
}

impl ClearResponse {
    /// Creates a new ClearResponse
    pub fn new(deleted: usize) -> Self {
        Self { deleted }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of capacity evictions
    pub evictions: u64,
    /// Number of TTL expirations
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
