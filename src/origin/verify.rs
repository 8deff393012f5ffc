//! Integrity verification of fetched content

use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::origin::FetchOutcome;

/// Number of hex characters of a digest that may appear in diagnostics.
pub const DIGEST_PREFIX_LEN: usize = 12;

/// Lowercase hex SHA-256 of `content`.
pub fn sha256_hex(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Truncates a digest to the length allowed in diagnostics.
pub fn digest_prefix(digest: &str) -> String {
    digest.chars().take(DIGEST_PREFIX_LEN).collect()
}

/// Checks `content` against `expected_digest`.
///
/// Returns `Delivered` with the same bytes on a match. On a mismatch the
/// content is dropped here and only digest prefixes are carried forward.
pub fn verify(content: Bytes, expected_digest: &str) -> FetchOutcome {
    let computed = sha256_hex(&content);
    if computed == expected_digest {
        return FetchOutcome::Delivered { content };
    }
    drop(content);

    let expected = digest_prefix(expected_digest);
    let got = digest_prefix(&computed);
    warn!(expected = %expected, got = %got, "Integrity mismatch, discarding content");
    FetchOutcome::IntegrityMismatch { expected, got }
}
