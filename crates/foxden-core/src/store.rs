//! Storage port for the shared watching record.
//!
//! The external key-value store is optional. Implementations report an
//! unconfigured backend through [`StoreError::Unconfigured`] instead of
//! every call site checking configuration first.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::models::WatchingRecord;

/// The single key the live record is stored under.
pub const WATCHING_KEY: &str = "now-watching";

/// How long a published record stays readable.
pub const WATCHING_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store not configured")]
    Unconfigured,

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Get / set-with-expiry access to a key-value store.
pub trait StatusStore: Send + Sync {
    /// Fetch the live record under `key`. `Ok(None)` means no record or
    /// the record expired.
    fn try_get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<WatchingRecord>, StoreError>> + Send;

    /// Replace the record under `key`, expiring it after `ttl`.
    fn try_set(
        &self,
        key: &str,
        record: &WatchingRecord,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// A store that is not there.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStore;

impl StatusStore for NoStore {
    async fn try_get(&self, _key: &str) -> Result<Option<WatchingRecord>, StoreError> {
        Err(StoreError::Unconfigured)
    }

    async fn try_set(
        &self,
        _key: &str,
        _record: &WatchingRecord,
        _ttl: Duration,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unconfigured)
    }
}

/// In-process store with per-key expiry.
///
/// Suitable for a single server instance; records do not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, (WatchingRecord, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl StatusStore for MemoryStore {
    async fn try_get(&self, key: &str) -> Result<Option<WatchingRecord>, StoreError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((record, expires_at)) if Instant::now() < *expires_at => {
                    return Ok(Some(record.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: evict so the map doesn't keep stale records around.
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|(_, expires_at)| Instant::now() >= *expires_at)
        {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn try_set(
        &self,
        key: &str,
        record: &WatchingRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let expires_at = Instant::now() + ttl;
        self.entries
            .write()
            .await
            .insert(key.to_owned(), (record.clone(), expires_at));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watching(title: &str) -> WatchingRecord {
        WatchingRecord {
            is_watching: true,
            title: Some(title.into()),
            ..WatchingRecord::not_watching()
        }
    }

    #[tokio::test]
    async fn test_no_store_is_unconfigured() {
        let store = NoStore;
        assert!(matches!(
            store.try_get(WATCHING_KEY).await,
            Err(StoreError::Unconfigured)
        ));
        assert!(matches!(
            store
                .try_set(WATCHING_KEY, &watching("X"), WATCHING_TTL)
                .await,
            Err(StoreError::Unconfigured)
        ));
    }

    #[tokio::test]
    async fn test_memory_store_get_missing() {
        let store = MemoryStore::new();
        assert!(store.try_get(WATCHING_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_set_replaces() {
        let store = MemoryStore::new();
        store
            .try_set(WATCHING_KEY, &watching("A"), WATCHING_TTL)
            .await
            .unwrap();
        store
            .try_set(WATCHING_KEY, &watching("B"), WATCHING_TTL)
            .await
            .unwrap();

        let got = store.try_get(WATCHING_KEY).await.unwrap().unwrap();
        assert_eq!(got.title(), Some("B"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_store_expires() {
        let store = MemoryStore::new();
        store
            .try_set(WATCHING_KEY, &watching("A"), WATCHING_TTL)
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(store.try_get(WATCHING_KEY).await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(store.try_get(WATCHING_KEY).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
