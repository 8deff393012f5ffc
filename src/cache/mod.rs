//! Cache Module
//!
//! Verified script snapshots, the store contract they live behind, and the
//! freshness math applied to them.

mod entry;
mod freshness;
mod stats;
mod status;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use freshness::{Freshness, FreshnessPolicy};
pub use stats::{MirrorStats, StatsSnapshot};
pub use status::CacheStatus;
pub use store::{CacheStore, MemoryStore};
