//! Cache Entry Module
//!
//! Defines a verified script snapshot as held by the cache store.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};

// == Cache Entry ==
/// A verified script body plus the metadata needed for freshness decisions.
///
/// Entries are only constructed from content that already passed integrity
/// verification, and are replaced wholesale rather than mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Raw bytes served to clients
    pub content: Bytes,
    /// Lowercase hex SHA-256 computed at write time
    pub content_digest: String,
    /// When the entry was verified and stored
    pub inserted_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry for content verified at `inserted_at`.
    pub fn new(content: Bytes, content_digest: impl Into<String>, inserted_at: DateTime<Utc>) -> Self {
        Self {
            content,
            content_digest: content_digest.into(),
            inserted_at,
        }
    }

    // == Age ==
    /// Returns how old the entry is at `now`.
    ///
    /// An insertion timestamp in the future (clock skew between writers of a
    /// shared store) yields an age of zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.inserted_at).to_std().unwrap_or(Duration::ZERO)
    }
}
