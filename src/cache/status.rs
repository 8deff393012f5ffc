//! Cache status tag attached to every served script.

use std::fmt;

/// How a successful response was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    /// Fresh entry served without contacting origin
    Hit,
    /// Nothing usable cached; fetched and verified from origin
    Miss,
    /// Stale entry replaced by a freshly verified fetch
    Refresh,
    /// Refresh failed; previously verified entry served instead
    Stale,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Refresh => "REFRESH",
            CacheStatus::Stale => "STALE",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
