//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint. Handlers are
//! thin: they translate between the HTTP surface and the orchestrator,
//! which owns all cache-aside decisions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use tokio::sync::RwLock;

use crate::cache::CacheStore;
use crate::error::Result;
use crate::generator::{NameGenerator, ValueGenerator};
use crate::models::{
    ClearResponse, DeleteItemResponse, HealthResponse, ItemResponse, StatsResponse,
};
use crate::orchestrator::CacheOrchestrator;
use crate::persist::{MemoryStore, PersistentStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The orchestrator serving every endpoint
    pub orchestrator: Arc<CacheOrchestrator>,
    /// Shared handle to the cache store, for the background sweeper
    pub cache: Arc<RwLock<CacheStore>>,
}

impl AppState {
    /// Creates a new AppState over the given collaborators.
    pub fn new(
        cache: CacheStore,
        store: Arc<dyn PersistentStore>,
        generator: Arc<dyn ValueGenerator>,
        op_timeout: Duration,
    ) -> Self {
        let cache = Arc::new(RwLock::new(cache));
        let orchestrator = Arc::new(CacheOrchestrator::new(
            cache.clone(),
            store,
            generator,
            op_timeout,
        ));
        Self {
            orchestrator,
            cache,
        }
    }

    /// Creates a new AppState from configuration, wiring the stock
    /// collaborators (in-process record store, name generator).
    pub fn from_config(config: &crate::config::Config) -> Self {
        let cache = CacheStore::new(config.max_entries, config.ttl());
        Self::new(
            cache,
            Arc::new(MemoryStore::new()),
            Arc::new(NameGenerator),
            config.op_timeout(),
        )
    }
}

/// Handler for GET /
///
/// Dumps the full cache-resident mapping key→value. Never consults the
/// persistent store and never generates.
pub async fn get_all_handler(State(state): State<AppState>) -> Json<HashMap<String, String>> {
    Json(state.orchestrator.get_all().await)
}

/// Handler for GET /item/:key
///
/// Resolves a key through the cache-aside flow, creating a value if the
/// key is unknown to both the cache and the persistent store.
pub async fn get_item_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ItemResponse>> {
    let item = state.orchestrator.get(&key).await?;
    Ok(Json(item.into()))
}

/// Handler for PUT /item/:key
///
/// Explicitly regenerates the value for a key. Fails when the key has no
/// persistent record.
pub async fn update_item_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ItemResponse>> {
    let item = state.orchestrator.update(&key).await?;
    Ok(Json(item.into()))
}

/// Handler for DELETE /
///
/// Empties the cache; persistent records survive.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let deleted = state.orchestrator.clear().await;
    Json(ClearResponse::new(deleted))
}

/// Handler for DELETE /item/:key
///
/// Removes a single key from the cache; its persistent record survives.
pub async fn delete_item_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteItemResponse>> {
    let removed = state.orchestrator.delete_one(&key).await?;
    Ok(Json(DeleteItemResponse::new(key, removed)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.orchestrator.stats().await;
    Json(stats.into())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
