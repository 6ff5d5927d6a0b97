use reqwest::Client;
use serde::Deserialize;
use url::Url;

use foxden_core::models::{WatchingRecord, WatchingUpdate};

use crate::error::{check_response, ApiError};
use crate::{endpoint, NOW_WATCHING_PATH};

#[derive(Debug, Deserialize)]
struct PublishResponse {
    data: WatchingRecord,
}

/// Pushes watching updates to the cloud publisher.
pub struct PublishClient {
    url: Url,
    api_key: Option<String>,
    http: Client,
}

impl PublishClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ApiError> {
        Ok(Self {
            url: endpoint(base_url, NOW_WATCHING_PATH)?,
            api_key: api_key.filter(|k| !k.is_empty()),
            http: Client::new(),
        })
    }

    /// Send an update. Returns the record as normalized by the publisher.
    pub async fn publish(&self, update: &WatchingUpdate) -> Result<WatchingRecord, ApiError> {
        let mut req = self.http.post(self.url.clone()).json(update);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = check_response(req.send().await?).await?;
        let body: PublishResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        tracing::debug!(title = ?body.data.title, "update published");
        Ok(body.data)
    }

    /// Convenience for clearing the status.
    pub async fn clear(&self) -> Result<WatchingRecord, ApiError> {
        self.publish(&WatchingUpdate::default()).await
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use chrono::Utc;
    use serde_json::{json, Value};

    use super::*;
    use crate::test_support::serve;

    /// Echoes the update back the way the publisher does, requiring `Bearer k`.
    async fn publisher_stub(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
        if auth != Some("Bearer k") {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid or missing API key" })),
            );
        }
        let update = WatchingUpdate::from_value(&body).unwrap();
        let record = update.into_record(Utc::now());
        (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Updated successfully", "data": record })),
        )
    }

    async fn stub() -> String {
        serve(Router::new().route("/api/now-watching", post(publisher_stub))).await
    }

    #[tokio::test]
    async fn test_publish_returns_normalized_record() {
        let client = PublishClient::new(&stub().await, Some("k".into())).unwrap();
        let update = WatchingUpdate {
            is_watching: true,
            title: Some("X".into()),
            episode: Some(3.into()),
            ..Default::default()
        };

        let record = client.publish(&update).await.unwrap();
        assert!(record.is_watching);
        assert_eq!(record.title(), Some("X"));
        assert_eq!(record.episode(), Some(3));
        assert_eq!(record.source(), Some("cloud"));
    }

    #[tokio::test]
    async fn test_clear() {
        let client = PublishClient::new(&stub().await, Some("k".into())).unwrap();
        let record = client.clear().await.unwrap();
        assert!(!record.is_watching);
    }

    #[tokio::test]
    async fn test_missing_key_is_unauthorized() {
        let client = PublishClient::new(&stub().await, None).unwrap();
        match client.clear().await.unwrap_err() {
            ApiError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid or missing API key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
