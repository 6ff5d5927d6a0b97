use reqwest::Client;
use url::Url;

use foxden_core::models::WatchingRecord;

use crate::error::{check_response, ApiError};
use crate::traits::StatusSource;
use crate::{endpoint, NOW_WATCHING_PATH};

/// A `GET /api/now-watching` endpoint.
///
/// Used both for the cloud publisher and the local companion process.
/// No request timeout is set here; callers that need a hard deadline
/// (the local probe) wrap the call themselves.
pub struct HttpStatusSource {
    name: String,
    url: Url,
    http: Client,
}

impl HttpStatusSource {
    pub fn new(name: impl Into<String>, base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            name: name.into(),
            url: endpoint(base_url, NOW_WATCHING_PATH)?,
            http: Client::new(),
        })
    }

    /// The cloud-hosted publisher.
    pub fn cloud(base_url: &str) -> Result<Self, ApiError> {
        Self::new("cloud", base_url)
    }

    /// The companion process on this machine.
    pub fn local(base_url: &str) -> Result<Self, ApiError> {
        Self::new("local", base_url)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl StatusSource for HttpStatusSource {
    type Error = ApiError;

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_status(&self) -> Result<WatchingRecord, ApiError> {
        let resp = self.http.get(self.url.clone()).send().await?;
        let resp = check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::test_support::serve;

    #[tokio::test]
    async fn test_fetch_status() {
        let router = Router::new().route(
            "/api/now-watching",
            get(|| async {
                Json(json!({
                    "isWatching": true,
                    "timestamp": "2026-01-04T12:30:00Z",
                    "title": "Y",
                    "episode": 4,
                    "source": "foxcli"
                }))
            }),
        );
        let base = serve(router).await;

        let source = HttpStatusSource::local(&base).unwrap();
        assert_eq!(source.name(), "local");

        let record = source.fetch_status().await.unwrap();
        assert!(record.is_watching);
        assert_eq!(record.title(), Some("Y"));
        assert_eq!(record.episode(), Some(4));
        assert_eq!(record.source(), Some("foxcli"));
    }

    #[tokio::test]
    async fn test_foreign_record_comes_back_unchanged() {
        let served = json!({
            "isWatching": true,
            "timestamp": "2026-01-04T12:30:00Z",
            "title": "Y",
            "episode": "12",
            "season": null,
            "progress": null,
            "source": "foxcli",
            "animeId": 5
        });
        let body = served.clone();
        let router = Router::new().route(
            "/api/now-watching",
            get(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        );
        let base = serve(router).await;

        let record = HttpStatusSource::local(&base)
            .unwrap()
            .fetch_status()
            .await
            .unwrap();
        assert_eq!(record.episode, Some(json!("12")));
        assert_eq!(record.extra["animeId"], json!(5));
        assert_eq!(serde_json::to_value(&record).unwrap(), served);
    }

    #[tokio::test]
    async fn test_non_success_is_api_error() {
        let router = Router::new().route(
            "/api/now-watching",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
            }),
        );
        let base = serve(router).await;

        let err = HttpStatusSource::cloud(&base)
            .unwrap()
            .fetch_status()
            .await
            .unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal server error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let router = Router::new().route("/api/now-watching", get(|| async { "not json" }));
        let base = serve(router).await;

        let err = HttpStatusSource::cloud(&base)
            .unwrap()
            .fetch_status()
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_is_http_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HttpStatusSource::local(&format!("http://{addr}"))
            .unwrap()
            .fetch_status()
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
    }
}
