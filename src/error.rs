//! Error types for the script mirror
//!
//! Every failure the mirror can hit while producing a response is classified
//! here. The `Display` text of each variant doubles as the user-facing reason
//! string carried in stale-fallback headers and 502 bodies.

use thiserror::Error;

// == Mirror Error Enum ==
/// Unified error type for the script mirror.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MirrorError {
    /// Origin did not deliver headers and body before the deadline
    #[error("upstream timeout after {0}ms")]
    FetchTimeout(u64),

    /// Origin answered with a non-success status
    #[error("upstream returned HTTP {0}")]
    UpstreamHttp(u16),

    /// Origin could not be reached or the body could not be read
    #[error("upstream unreachable: {0}")]
    UpstreamTransport(String),

    /// Fetched content did not hash to the expected digest.
    /// Both fields hold digest prefixes only.
    #[error("integrity check failed: expected sha256 {expected}..., got {got}...")]
    IntegrityMismatch { expected: String, got: String },

    /// The cache store itself could not be read or written
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Invalid startup configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

// == Result Type Alias ==
/// Convenience Result type for the script mirror.
pub type Result<T> = std::result::Result<T, MirrorError>;
