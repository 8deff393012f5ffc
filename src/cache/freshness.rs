//! Freshness Module
//!
//! Classifies a cache read against the fresh and stale windows.
//!
//! The store keeps no expiry of its own; freshness is derived here from the
//! entry's insertion timestamp and a single per-request snapshot of "now".

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::CacheEntry;

// == Freshness ==
/// How a cached entry may be used for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// `age < fresh_ttl`: serve without contacting origin
    Fresh,
    /// `fresh_ttl <= age < stale_ttl`: refresh, fall back to the entry on failure
    StaleUsable,
    /// `age >= stale_ttl` or nothing cached
    Expired,
}

// == Freshness Policy ==
/// The two configured thresholds, `fresh_ttl <= stale_ttl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    fresh_ttl: Duration,
    stale_ttl: Duration,
}

impl FreshnessPolicy {
    /// Creates a policy.
    ///
    /// # Panics
    /// If `fresh_ttl > stale_ttl`. Configuration validation rejects this
    /// before a policy is ever built.
    pub fn new(fresh_ttl: Duration, stale_ttl: Duration) -> Self {
        assert!(
            fresh_ttl <= stale_ttl,
            "fresh_ttl ({:?}) must not exceed stale_ttl ({:?})",
            fresh_ttl,
            stale_ttl
        );
        Self {
            fresh_ttl,
            stale_ttl,
        }
    }

    pub fn fresh_ttl(&self) -> Duration {
        self.fresh_ttl
    }

    pub fn stale_ttl(&self) -> Duration {
        self.stale_ttl
    }

    /// Classifies an entry age.
    pub fn classify_age(&self, age: Duration) -> Freshness {
        if age < self.fresh_ttl {
            Freshness::Fresh
        } else if age < self.stale_ttl {
            Freshness::StaleUsable
        } else {
            Freshness::Expired
        }
    }

    /// Classifies an optional entry at `now`. Absent entries are `Expired`.
    pub fn classify(&self, entry: Option<&CacheEntry>, now: DateTime<Utc>) -> Freshness {
        match entry {
            Some(entry) => self.classify_age(entry.age(now)),
            None => Freshness::Expired,
        }
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(300), Duration::from_secs(86_400))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::TimeZone;

    fn policy() -> FreshnessPolicy {
        FreshnessPolicy::new(Duration::from_secs(300), Duration::from_secs(86_400))
    }

    #[test]
    fn test_boundaries() {
        let p = policy();
        assert_eq!(p.classify_age(Duration::ZERO), Freshness::Fresh);
        assert_eq!(p.classify_age(Duration::from_millis(299_999)), Freshness::Fresh);
        assert_eq!(p.classify_age(Duration::from_secs(300)), Freshness::StaleUsable);
        assert_eq!(p.classify_age(Duration::from_millis(86_399_999)), Freshness::StaleUsable);
        assert_eq!(p.classify_age(Duration::from_secs(86_400)), Freshness::Expired);
    }

    #[test]
    fn test_absent_entry_is_expired() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(policy().classify(None, now), Freshness::Expired);
    }

    #[test]
    fn test_classify_entry() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let entry = CacheEntry::new(Bytes::from_static(b"x"), "d", t0);

        assert_eq!(
            policy().classify(Some(&entry), t0 + chrono::Duration::seconds(10)),
            Freshness::Fresh
        );
        assert_eq!(
            policy().classify(Some(&entry), t0 + chrono::Duration::seconds(310)),
            Freshness::StaleUsable
        );
        assert_eq!(
            policy().classify(Some(&entry), t0 + chrono::Duration::seconds(90_000)),
            Freshness::Expired
        );
    }

    #[test]
    fn test_zero_windows_never_fresh() {
        let p = FreshnessPolicy::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(p.classify_age(Duration::ZERO), Freshness::Expired);
    }

    #[test]
    #[should_panic]
    fn test_inverted_windows_panic() {
        FreshnessPolicy::new(Duration::from_secs(10), Duration::from_secs(5));
    }
}
