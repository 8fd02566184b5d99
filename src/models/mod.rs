//! Response models for the cache service API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing HTTP response bodies. The API takes no request bodies:
//! keys arrive in the path and values are resolved server-side.

pub mod responses;

// Re-export commonly used types
pub use responses::{
    ClearResponse, DeleteItemResponse, ErrorResponse, HealthResponse, ItemResponse,
    StatsResponse,
};
