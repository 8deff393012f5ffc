//! Bootible Edge - Verified script mirror
//!
//! Serves provisioning scripts mirrored from upstream, verified against a
//! pinned SHA-256 digest, with stale fallback when origin misbehaves.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod mirror;
pub mod models;
pub mod origin;
pub mod routes;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_prune_task;
