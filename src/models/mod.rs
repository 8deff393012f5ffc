//! Response models for the service endpoints
//!
//! DTOs serialized as JSON by `/health` and `/stats`. Script responses are
//! raw bodies and carry their metadata in headers instead.

pub mod responses;

// Re-export commonly used types
pub use responses::{HealthResponse, StatsResponse};
