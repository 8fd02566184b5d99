//! API Module
//!
//! HTTP handlers and routing for the cache service REST API.
//!
//! # Endpoints
//! - `GET /` - Dump the cache-resident mapping
//! - `DELETE /` - Clear the cache
//! - `GET /item/:key` - Resolve a key (get-or-create)
//! - `PUT /item/:key` - Regenerate a key's value
//! - `DELETE /item/:key` - Drop a key from the cache
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
