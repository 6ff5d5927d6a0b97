//! Store selection for the publisher.

use std::time::Duration;

use foxden_api::KvRestStore;
use foxden_core::models::WatchingRecord;
use foxden_core::store::{MemoryStore, NoStore, StatusStore, StoreError};

use crate::config::Config;

/// The store backing this server instance, picked once at startup.
pub enum StoreBackend {
    Kv(KvRestStore),
    Memory(MemoryStore),
    Absent(NoStore),
}

impl StoreBackend {
    /// REST store when configured, otherwise an in-process store if
    /// enabled, otherwise nothing.
    pub fn from_config(cfg: &Config) -> Self {
        match (&cfg.kv_url, &cfg.kv_token) {
            (Some(url), Some(token)) => Self::Kv(KvRestStore::new(url.clone(), token.clone())),
            _ if cfg.memory_store => Self::Memory(MemoryStore::new()),
            _ => Self::Absent(NoStore),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Kv(_) => "kv-rest",
            Self::Memory(_) => "memory",
            Self::Absent(_) => "none",
        }
    }
}

impl StatusStore for StoreBackend {
    async fn try_get(&self, key: &str) -> Result<Option<WatchingRecord>, StoreError> {
        match self {
            Self::Kv(s) => s.try_get(key).await,
            Self::Memory(s) => s.try_get(key).await,
            Self::Absent(s) => s.try_get(key).await,
        }
    }

    async fn try_set(
        &self,
        key: &str,
        record: &WatchingRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        match self {
            Self::Kv(s) => s.try_set(key, record, ttl).await,
            Self::Memory(s) => s.try_set(key, record, ttl).await,
            Self::Absent(s) => s.try_set(key, record, ttl).await,
        }
    }
}
