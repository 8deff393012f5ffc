//! Configuration Module
//!
//! Handles loading and validating mirror configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::FreshnessPolicy;
use crate::error::{MirrorError, Result};

/// Default upstream the scripts are mirrored from.
pub const DEFAULT_UPSTREAM_BASE: &str = "https://raw.githubusercontent.com/gavinmcfall/bootible/main";

/// Default support channel referenced in failure bodies.
pub const DEFAULT_SUPPORT_URL: &str = "https://github.com/gavinmcfall/bootible/issues";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base locator scripts are fetched from
    pub upstream_base: String,
    /// Seconds an entry is served without contacting origin
    pub fresh_ttl: u64,
    /// Seconds an entry remains usable as a fallback
    pub stale_ttl: u64,
    /// Hard deadline for one origin fetch, in milliseconds
    pub fetch_timeout_ms: u64,
    /// JSON file describing the mirrored routes
    pub routes_file: PathBuf,
    /// Directory served for requests that match no route
    pub assets_dir: PathBuf,
    /// Support channel mentioned in 502 bodies
    pub support_url: String,
    /// Background prune frequency in seconds
    pub prune_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_BASE` - Origin base locator (default: Bootible main branch)
    /// - `FRESH_TTL` - Fresh window in seconds (default: 300)
    /// - `STALE_TTL` - Stale-fallback window in seconds (default: 86400)
    /// - `FETCH_TIMEOUT_MS` - Origin deadline in milliseconds (default: 10000)
    /// - `ROUTES_FILE` - Route table JSON (default: routes.json)
    /// - `ASSETS_DIR` - Static asset directory (default: public)
    /// - `SUPPORT_URL` - Support channel for failure bodies
    /// - `PRUNE_INTERVAL` - Prune frequency in seconds (default: 3600)
    ///
    /// Fails if the resulting values violate [`Config::validate`].
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            server_port: parse_var("SERVER_PORT", defaults.server_port)?,
            upstream_base: env::var("UPSTREAM_BASE").unwrap_or(defaults.upstream_base),
            fresh_ttl: parse_var("FRESH_TTL", defaults.fresh_ttl)?,
            stale_ttl: parse_var("STALE_TTL", defaults.stale_ttl)?,
            fetch_timeout_ms: parse_var("FETCH_TIMEOUT_MS", defaults.fetch_timeout_ms)?,
            routes_file: env::var("ROUTES_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.routes_file),
            assets_dir: env::var("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.assets_dir),
            support_url: env::var("SUPPORT_URL").unwrap_or(defaults.support_url),
            prune_interval: parse_var("PRUNE_INTERVAL", defaults.prune_interval)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the mirror cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.fresh_ttl > self.stale_ttl {
            return Err(MirrorError::Config(format!(
                "FRESH_TTL ({}s) exceeds STALE_TTL ({}s)",
                self.fresh_ttl, self.stale_ttl
            )));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(MirrorError::Config(
                "FETCH_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }
        if self.prune_interval == 0 {
            return Err(MirrorError::Config(
                "PRUNE_INTERVAL must be greater than zero".to_string(),
            ));
        }
        if !self.upstream_base.starts_with("http://") && !self.upstream_base.starts_with("https://")
        {
            return Err(MirrorError::Config(format!(
                "UPSTREAM_BASE '{}' is not an http(s) locator",
                self.upstream_base
            )));
        }
        Ok(())
    }

    pub fn freshness_policy(&self) -> FreshnessPolicy {
        FreshnessPolicy::new(
            Duration::from_secs(self.fresh_ttl),
            Duration::from_secs(self.stale_ttl),
        )
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// Parses `name` if set. An unset variable yields `default`; a set but
/// unparsable one is a configuration error.
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| MirrorError::Config(format!("{}: invalid value '{}'", name, value))),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(env::VarError::NotUnicode(_)) => Err(MirrorError::Config(format!(
            "{}: value is not valid unicode",
            name
        ))),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            upstream_base: DEFAULT_UPSTREAM_BASE.to_string(),
            fresh_ttl: 300,
            stale_ttl: 86_400,
            fetch_timeout_ms: 10_000,
            routes_file: PathBuf::from("routes.json"),
            assets_dir: PathBuf::from("public"),
            support_url: DEFAULT_SUPPORT_URL.to_string(),
            prune_interval: 3600,
        }
    }
}
