//! Origin Module
//!
//! Fetching scripts from upstream and authenticating what comes back.

mod fetcher;
mod verify;

pub use fetcher::{cache_busted, FetchOutcome, HttpFetcher, OriginFetcher, UpstreamFailure};
pub use verify::{digest_prefix, sha256_hex, verify, DIGEST_PREFIX_LEN};
