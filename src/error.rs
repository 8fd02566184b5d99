//! Error types for the cache service
//!
//! Provides the closed error taxonomy shared by the cache store, the
//! orchestrator and the HTTP layer, using thiserror. Collaborator failures
//! are discriminated by variant, never by message text.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache service.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key absent where one was required
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid key or value supplied by the caller
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Cache store full on insert; fatal only after the eviction retry
    #[error("cache at capacity ({0} entries)")]
    CapacityExceeded(usize),

    /// Persistent update matched zero records
    #[error("update failed: no persistent record for key '{0}'")]
    UpdateFailed(String),

    /// The value generator errored
    #[error("value generation failed: {0}")]
    GenerationFailure(String),

    /// I/O failure from the persistent store
    #[error("persistent store failure: {0}")]
    StoreFailure(String),

    /// A suspending call did not finish within the configured deadline
    #[error("operation exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::UpdateFailed(_) => {
                StatusCode::BAD_REQUEST
            }
            CacheError::CapacityExceeded(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::GenerationFailure(_) | CacheError::StoreFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            CacheError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache service.
pub type Result<T> = std::result::Result<T, CacheError>;
