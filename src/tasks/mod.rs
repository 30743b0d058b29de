//! Background Tasks Module
//!
//! Contains background tasks that run for the life of the process.
//!
//! # Tasks
//! - Expiry sweep: evicts expired cache entries at a fixed interval

mod sweeper;

pub use sweeper::spawn_sweeper_task;
