//! Staleness Orchestrator
//!
//! Decides per request whether to serve from cache, refresh from origin, or
//! fall back to a previously verified snapshot.
//!
//! | cache state   | origin ok         | origin failed          |
//! |---------------|-------------------|------------------------|
//! | fresh         | not contacted     | not contacted          |
//! | stale-usable  | store, `REFRESH`  | serve old, `STALE`     |
//! | expired/none  | store, `MISS`     | `Err` (502)            |

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cache::{
    CacheEntry, CacheStatus, CacheStore, Freshness, FreshnessPolicy, MirrorStats, StatsSnapshot,
};
use crate::error::Result;
use crate::origin::{verify, FetchOutcome, OriginFetcher};
use crate::routes::RouteDescriptor;

// == Served ==
/// Verified content ready for the response assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub status: CacheStatus,
    pub content: Bytes,
    /// Lowercase hex SHA-256 of `content`
    pub digest: String,
    pub inserted_at: DateTime<Utc>,
    pub age: Duration,
    /// Why the refresh failed; only set for `STALE`
    pub stale_reason: Option<String>,
}

impl Served {
    fn from_entry(
        entry: CacheEntry,
        status: CacheStatus,
        now: DateTime<Utc>,
        stale_reason: Option<String>,
    ) -> Self {
        Self {
            status,
            age: entry.age(now),
            content: entry.content,
            digest: entry.content_digest,
            inserted_at: entry.inserted_at,
            stale_reason,
        }
    }
}

// == Orchestrator ==
/// Composes the cache store, origin fetcher and verifier.
///
/// Holds no per-key state between requests; the store is the only shared
/// mutable resource. Concurrent requests for the same expired key each
/// fetch independently and the last write wins.
pub struct Orchestrator {
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn OriginFetcher>,
    policy: FreshnessPolicy,
    upstream_base: String,
    fetch_timeout: Duration,
    stats: MirrorStats,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn OriginFetcher>,
        policy: FreshnessPolicy,
        upstream_base: impl Into<String>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            store,
            fetcher,
            policy,
            upstream_base: upstream_base.into(),
            fetch_timeout,
            stats: MirrorStats::new(),
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Produces verified content for `route`, or the reason none is available.
    ///
    /// `now` is the single time snapshot used for every freshness decision
    /// and for the timestamp of any entry written during this call.
    pub async fn serve(&self, route: &RouteDescriptor, now: DateTime<Utc>) -> Result<Served> {
        let cached = self.read_cache(route).await;
        let freshness = self.policy.classify(cached.as_ref(), now);
        debug!(route = %route.key, ?freshness, "Classified cache entry");

        let served = match (freshness, cached) {
            (Freshness::Fresh, Some(entry)) => Served::from_entry(entry, CacheStatus::Hit, now, None),
            (Freshness::StaleUsable, Some(entry)) => match self.refresh(route, now).await {
                Ok(fresh) => Served::from_entry(fresh, CacheStatus::Refresh, now, None),
                Err(err) => {
                    warn!(route = %route.key, reason = %err, "Refresh failed, serving stale entry");
                    Served::from_entry(entry, CacheStatus::Stale, now, Some(err.to_string()))
                }
            },
            _ => match self.refresh(route, now).await {
                Ok(fresh) => Served::from_entry(fresh, CacheStatus::Miss, now, None),
                Err(err) => {
                    warn!(route = %route.key, reason = %err, "No usable entry and origin failed");
                    self.stats.record_failure();
                    return Err(err);
                }
            },
        };

        info!(
            route = %route.key,
            status = %served.status,
            age_secs = served.age.as_secs(),
            "Serving script"
        );
        self.stats.record(served.status);
        Ok(served)
    }

    /// Reads the current snapshot, treating an unreachable store or an entry
    /// verified against a since-rotated digest as absent.
    async fn read_cache(&self, route: &RouteDescriptor) -> Option<CacheEntry> {
        match self.store.get(&route.key).await {
            Ok(Some(entry)) if entry.content_digest == route.expected_digest => Some(entry),
            Ok(Some(_)) => {
                info!(route = %route.key, "Cached entry predates digest change, ignoring");
                None
            }
            Ok(None) => None,
            Err(err) => {
                warn!(route = %route.key, error = %err, "Cache read failed");
                None
            }
        }
    }

    /// One origin attempt: fetch, verify, then store the verified snapshot.
    async fn refresh(&self, route: &RouteDescriptor, now: DateTime<Utc>) -> Result<CacheEntry> {
        let locator = route.upstream_locator(&self.upstream_base);
        let outcome = match self.fetcher.fetch(&locator, self.fetch_timeout).await {
            FetchOutcome::Delivered { content } => verify(content, &route.expected_digest),
            failure => failure,
        };
        let content = outcome.into_result(self.fetch_timeout)?;

        let entry = CacheEntry::new(content, route.expected_digest.clone(), now);
        if let Err(err) = self.store.put(&route.key, entry.clone()).await {
            // Content is verified; serve it even if it could not be kept.
            warn!(route = %route.key, error = %err, "Cache write failed");
        }
        Ok(entry)
    }
}
