//! Prune Task
//!
//! Background task that physically removes snapshots past the stale window.
//! The orchestrator already ignores such entries; this only reclaims memory.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryStore;

/// Spawns a background task that periodically prunes expired snapshots.
///
/// Every `interval`, entries inserted more than `stale_ttl` ago are dropped.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_prune_task(
    store: Arc<MemoryStore>,
    stale_ttl: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            stale_ttl_secs = stale_ttl.as_secs(),
            "Starting cache prune task"
        );

        // An out-of-range window prunes nothing.
        let window = chrono::Duration::from_std(stale_ttl).ok();

        loop {
            tokio::time::sleep(interval).await;

            let cutoff = window.and_then(|w| Utc::now().checked_sub_signed(w));
            let removed = match cutoff {
                Some(cutoff) => store.prune_older_than(cutoff).await,
                None => 0,
            };

            if removed > 0 {
                info!(removed, "Cache prune: removed expired snapshots");
            } else {
                debug!("Cache prune: nothing to remove");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, CacheStore};
    use bytes::Bytes;

    fn entry_aged(age: chrono::Duration) -> CacheEntry {
        CacheEntry::new(Bytes::from_static(b"echo hi"), "d", Utc::now() - age)
    }

    #[tokio::test]
    async fn test_prune_task_removes_expired_entries() {
        let store = Arc::new(MemoryStore::new());
        store
            .put("/deck", entry_aged(chrono::Duration::hours(2)))
            .await
            .unwrap();

        let handle = spawn_prune_task(
            store.clone(),
            Duration::from_secs(3600),
            Duration::from_millis(50),
        );

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(
            store.get("/deck").await.unwrap().is_none(),
            "Expired entry should have been pruned"
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_prune_task_preserves_usable_entries() {
        let store = Arc::new(MemoryStore::new());
        store
            .put("/rog", entry_aged(chrono::Duration::minutes(10)))
            .await
            .unwrap();

        let handle = spawn_prune_task(
            store.clone(),
            Duration::from_secs(3600),
            Duration::from_millis(50),
        );

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(
            store.get("/rog").await.unwrap().is_some(),
            "Usable entry should not be removed"
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_prune_task_can_be_aborted() {
        let store = Arc::new(MemoryStore::new());

        let handle = spawn_prune_task(store, Duration::from_secs(60), Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
