//! The status publisher: authenticated writes and fail-safe reads of the
//! shared watching record.
//!
//! Reads never fail. A store that is unreachable, unconfigured, or empty
//! yields a fresh "not watching" record.
//!
//! Writes are authoritative for the immediate response only. Persisting
//! the record is best-effort: the outcome is reported as [`Persistence`]
//! and logged, but never turns a valid write into an error. Callers must
//! not assume durability from a successful write.

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

use crate::models::{WatchingRecord, WatchingUpdate};
use crate::store::{StatusStore, StoreError, WATCHING_KEY, WATCHING_TTL};

const BEARER_PREFIX: &str = "Bearer ";

/// Errors surfaced to the writer. Store faults never appear here.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),
}

/// What happened to the record on its way to durable storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    Stored,
    /// No store is configured.
    Skipped,
    Failed(String),
}

/// Result of a successful write.
#[derive(Debug, Clone)]
pub struct Published {
    pub record: WatchingRecord,
    pub persistence: Persistence,
}

pub struct Publisher<S> {
    store: S,
    secret: Option<String>,
}

impl<S: StatusStore> Publisher<S> {
    /// An empty secret is treated as no secret.
    pub fn new(store: S, secret: Option<String>) -> Self {
        Self {
            store,
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn requires_auth(&self) -> bool {
        self.secret.is_some()
    }

    /// Current record, or a default "not watching" record.
    pub async fn read(&self) -> WatchingRecord {
        match self.store.try_get(WATCHING_KEY).await {
            Ok(Some(record)) => record,
            Ok(None) => WatchingRecord::not_watching(),
            Err(StoreError::Unconfigured) => WatchingRecord::not_watching(),
            Err(e) => {
                tracing::error!(error = %e, "store read failed");
                WatchingRecord::not_watching()
            }
        }
    }

    /// Check a raw `Authorization` header value against the secret.
    pub fn authorize(&self, credential: Option<&str>) -> Result<(), PublishError> {
        let Some(expected) = &self.secret else {
            return Ok(());
        };

        let provided = credential.map(|c| c.strip_prefix(BEARER_PREFIX).unwrap_or(c));
        if provided == Some(expected.as_str()) {
            Ok(())
        } else {
            tracing::warn!(has_credential = credential.is_some(), "publish rejected");
            Err(PublishError::Unauthorized)
        }
    }

    /// Authorize, validate, normalize, and store a candidate record.
    pub async fn write(
        &self,
        candidate: &Value,
        credential: Option<&str>,
    ) -> Result<Published, PublishError> {
        self.authorize(credential)?;

        let update = WatchingUpdate::from_value(candidate).map_err(PublishError::Validation)?;
        let record = update.into_record(Utc::now());

        let persistence = match self
            .store
            .try_set(WATCHING_KEY, &record, WATCHING_TTL)
            .await
        {
            Ok(()) => Persistence::Stored,
            Err(StoreError::Unconfigured) => Persistence::Skipped,
            Err(e) => {
                tracing::error!(error = %e, "store write failed");
                Persistence::Failed(e.to_string())
            }
        };

        tracing::info!(
            title = record.title().unwrap_or("-"),
            is_watching = record.is_watching,
            ?persistence,
            "watching status published"
        );

        Ok(Published {
            record,
            persistence,
        })
    }
}
