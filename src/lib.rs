//! keystash - a cache-aside HTTP service
//!
//! Serves short textual values addressed by opaque string keys. Reads
//! resolve through a bounded in-memory cache with per-key TTL, falling
//! back to a persistent record store and finally to a value generator
//! for keys nobody has seen. Lapsed entries are regenerated lazily on
//! next access; a capacity-eviction policy frees slots when the cache
//! is full.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod generator;
pub mod models;
pub mod orchestrator;
pub mod persist;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use orchestrator::CacheOrchestrator;
pub use tasks::spawn_cleanup_task;
