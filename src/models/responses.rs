//! Response DTOs for the service endpoints
//!
//! Defines the structure of outgoing JSON bodies.

use serde::Serialize;

use crate::cache::StatsSnapshot;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Fresh entries served without origin contact
    pub hits: u64,
    /// Responses fetched because nothing usable was cached
    pub misses: u64,
    /// Stale entries replaced by a verified fetch
    pub refreshes: u64,
    /// Stale entries served because refresh failed
    pub stale: u64,
    /// 502 responses
    pub failures: u64,
    /// hits / all script responses
    pub hit_rate: f64,
    /// Number of configured routes
    pub routes: usize,
}

impl StatsResponse {
    /// Creates a new StatsResponse from an outcome snapshot
    pub fn new(stats: StatsSnapshot, routes: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            refreshes: stats.refreshes,
            stale: stats.stale,
            failures: stats.failures,
            hit_rate: stats.hit_rate(),
            routes,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
