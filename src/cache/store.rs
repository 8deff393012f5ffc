//! Cache Store Module
//!
//! The narrow get/put contract the orchestrator depends on, plus an
//! in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::cache::CacheEntry;
use crate::error::Result;

// == Cache Store Trait ==
/// Shared key/value store for verified script snapshots.
///
/// Implementations must tolerate concurrent readers and writers without
/// external locking. `put` is an unconditional overwrite (last write wins);
/// no operation spans more than one get or one put.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the entry for `key`, if any. Errors mean the store itself is
    /// unreachable, not that the key is missing.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Replaces whatever is stored under `key`.
    async fn put(&self, key: &str, entry: CacheEntry) -> Result<()>;
}

// == Memory Store ==
/// In-process `CacheStore` backed by a `HashMap` behind an async `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Prune ==
    /// Removes entries inserted before `cutoff`.
    ///
    /// Returns the number of entries removed.
    pub async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.inserted_at >= cutoff);
        before - entries.len()
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if the store is empty.
    #[allow(dead_code)]
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn entry(body: &'static [u8], at: DateTime<Utc>) -> CacheEntry {
        CacheEntry::new(Bytes::from_static(body), "digest", at)
    }

    #[tokio::test]
    async fn test_store_new() {
        let store = MemoryStore::new();
        assert_eq!(store.len().await, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_put_and_get() {
        let store = MemoryStore::new();

        store.put("/deck", entry(b"v1", t0())).await.unwrap();
        let fetched = store.get("/deck").await.unwrap().unwrap();

        assert_eq!(fetched.content, Bytes::from_static(b"v1"));
        assert_eq!(fetched.inserted_at, t0());
    }

    #[tokio::test]
    async fn test_store_get_absent() {
        let store = MemoryStore::new();
        assert!(store.get("/nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_overwrite() {
        let store = MemoryStore::new();
        let later = t0() + chrono::Duration::seconds(60);

        store.put("/deck", entry(b"v1", t0())).await.unwrap();
        store.put("/deck", entry(b"v2", later)).await.unwrap();

        let fetched = store.get("/deck").await.unwrap().unwrap();
        assert_eq!(fetched.content, Bytes::from_static(b"v2"));
        assert_eq!(fetched.inserted_at, later);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_prune() {
        let store = MemoryStore::new();
        store.put("/old", entry(b"old", t0())).await.unwrap();
        store
            .put("/new", entry(b"new", t0() + chrono::Duration::hours(2)))
            .await
            .unwrap();

        let removed = store.prune_older_than(t0() + chrono::Duration::hours(1)).await;

        assert_eq!(removed, 1);
        assert!(store.get("/old").await.unwrap().is_none());
        assert!(store.get("/new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_writers_last_write_wins() {
        let store = Arc::new(MemoryStore::new());

        let mut handles = Vec::new();
        for i in 0..16i64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let at = t0() + chrono::Duration::seconds(i);
                store.put("/deck", entry(b"same", at)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len().await, 1);
        let fetched = store.get("/deck").await.unwrap().unwrap();
        assert_eq!(fetched.content, Bytes::from_static(b"same"));
    }
}
