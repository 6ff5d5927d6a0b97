//! REST key-value store (Vercel KV / Upstash wire format).
//!
//! Each command is POSTed to the store URL as a JSON array, e.g.
//! `["SET", "now-watching", "<json>", "EX", "300"]`, with a bearer token.
//! Replies are `{"result": ...}` on success and `{"error": "..."}` on
//! failure. Values are stored as JSON-encoded strings.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use foxden_core::models::WatchingRecord;
use foxden_core::store::{StatusStore, StoreError};

use crate::error::{check_response, ApiError};

/// Environment variable holding the store's REST URL.
pub const ENV_KV_URL: &str = "VERCEL_KV_REST_API_URL";
/// Environment variable holding the store's bearer token.
pub const ENV_KV_TOKEN: &str = "VERCEL_KV_REST_API_TOKEN";

#[derive(Debug, Deserialize)]
struct KvReply {
    #[serde(default)]
    result: Value,
}

pub struct KvRestStore {
    url: String,
    token: String,
    http: Client,
}

impl KvRestStore {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            http: Client::new(),
        }
    }

    /// Build from the environment. Both variables must be set and non-empty.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var(ENV_KV_URL).ok().filter(|v| !v.is_empty())?;
        let token = std::env::var(ENV_KV_TOKEN).ok().filter(|v| !v.is_empty())?;
        Some(Self::new(url, token))
    }

    async fn command(&self, args: Value) -> Result<Value, ApiError> {
        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await?;

        let resp = check_response(resp).await?;
        let reply: KvReply = resp
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(reply.result)
    }
}

impl StatusStore for KvRestStore {
    async fn try_get(&self, key: &str) -> Result<Option<WatchingRecord>, StoreError> {
        let result = self
            .command(json!(["GET", key]))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match result {
            Value::Null => Ok(None),
            Value::String(encoded) => Ok(Some(serde_json::from_str(&encoded)?)),
            // Some clients store objects without the string wrapper.
            other => Ok(Some(serde_json::from_value(other)?)),
        }
    }

    async fn try_set(
        &self,
        key: &str,
        record: &WatchingRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(record)?;
        self.command(json!(["SET", key, encoded, "EX", ttl.as_secs().to_string()]))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
