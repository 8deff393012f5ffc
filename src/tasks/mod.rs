//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Prune: Drops in-memory snapshots too old to serve even as a fallback

mod prune;

pub use prune::spawn_prune_task;
