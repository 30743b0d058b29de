//! API Module
//!
//! HTTP handlers and routing for the cache ops API.
//!
//! # Endpoints
//! - `GET /ranges/:range` - Read a range through the cache
//! - `PUT /ranges/:range` - Write a range and invalidate a cache key
//! - `DELETE /cache/:key` - Invalidate one cache key
//! - `DELETE /cache?prefix=` - Invalidate every key under a prefix
//! - `DELETE /cache?all=true` - Drop every cached entry
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
