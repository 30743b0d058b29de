//! Sheet Cache - read-through cache in front of a spreadsheet-backed store
//!
//! Provides TTL expiry, single-flight deduplication of upstream fetches and
//! key or prefix invalidation after writes.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod facade;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use config::Config;
pub use facade::DataAccess;
pub use tasks::spawn_sweeper_task;
