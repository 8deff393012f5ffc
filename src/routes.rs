//! Route Table Module
//!
//! Static mapping from request path to upstream script, label and the
//! SHA-256 digest any served content must match. Built once at startup.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{MirrorError, Result};

/// Length of a lowercase hex SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Paths served by the mirror itself.
const RESERVED_KEYS: &[&str] = &["/", "/health", "/stats"];

// == Route Descriptor ==
/// A single mirrored script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteDescriptor {
    /// Request path, e.g. `/deck`
    pub key: String,
    /// Path of the script relative to the upstream base
    pub upstream_path: String,
    /// Human-readable device label, surfaced in a response header
    pub label: String,
    /// Lowercase hex SHA-256 of the known-good script
    pub expected_digest: String,
}

impl RouteDescriptor {
    /// Full origin locator for this route under `base`.
    pub fn upstream_locator(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.upstream_path)
    }

    fn validate(&self) -> Result<()> {
        if !self.key.starts_with('/') {
            return Err(MirrorError::Config(format!(
                "route key '{}' must start with '/'",
                self.key
            )));
        }
        if !self.upstream_path.starts_with('/') {
            return Err(MirrorError::Config(format!(
                "route '{}' upstream_path '{}' must start with '/'",
                self.key, self.upstream_path
            )));
        }
        if self.key.contains([':', '*', '{', '}', '?']) {
            return Err(MirrorError::Config(format!(
                "route key '{}' must be a literal path",
                self.key
            )));
        }
        if RESERVED_KEYS.contains(&self.key.as_str()) {
            return Err(MirrorError::Config(format!(
                "route key '{}' is reserved",
                self.key
            )));
        }
        if !is_sha256_hex(&self.expected_digest) {
            return Err(MirrorError::Config(format!(
                "route '{}' needs a {}-char lowercase hex expected_digest",
                self.key, DIGEST_HEX_LEN
            )));
        }
        Ok(())
    }
}

fn is_sha256_hex(digest: &str) -> bool {
    digest.len() == DIGEST_HEX_LEN
        && digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

// == Route Table ==
/// Immutable lookup table keyed by exact request path.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteDescriptor>,
}

impl RouteTable {
    /// Builds a table, rejecting malformed descriptors and duplicate keys.
    pub fn new(descriptors: Vec<RouteDescriptor>) -> Result<Self> {
        let mut routes = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            descriptor.validate()?;
            if routes.contains_key(&descriptor.key) {
                return Err(MirrorError::Config(format!(
                    "duplicate route key '{}'",
                    descriptor.key
                )));
            }
            routes.insert(descriptor.key.clone(), descriptor);
        }
        Ok(Self { routes })
    }

    /// Parses a JSON array of descriptors.
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptors: Vec<RouteDescriptor> = serde_json::from_str(json)
            .map_err(|e| MirrorError::Config(format!("malformed route table: {}", e)))?;
        Self::new(descriptors)
    }

    /// Reads and parses the route file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            MirrorError::Config(format!("cannot read route file {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Exact-match lookup. `None` means the request belongs to the static assets.
    pub fn lookup(&self, key: &str) -> Option<&RouteDescriptor> {
        self.routes.get(key)
    }

    /// Iterates over all configured route keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
