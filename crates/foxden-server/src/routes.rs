//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - `/api/now-watching` (and the older `/api/update-watching` path):
//!   GET reads, POST publishes, OPTIONS answers pre-flight
//! - `/data.json` when a site document is configured
//! - `/health`
//! - panic catching, request tracing, and CORS headers on everything

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, MethodRouter};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

use foxden_core::models::WatchingRecord;

use crate::error::ServerError;
use crate::middleware::{cors_headers, panic_response};
use crate::state::AppState;

pub const NOW_WATCHING: &str = "/api/now-watching";
pub const UPDATE_WATCHING: &str = "/api/update-watching";

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: WatchingRecord,
}

/// Build the complete router for the application.
pub fn build(state: Arc<AppState>) -> Router {
    with_layers(api_routes(&state)).with_state(state)
}

/// Routes without middleware.
pub fn api_routes(state: &AppState) -> Router<Arc<AppState>> {
    let mut router = Router::new()
        .route(NOW_WATCHING, now_watching())
        .route(UPDATE_WATCHING, now_watching())
        .route("/health", get(get_health));

    if let Some(path) = &state.config.data_file {
        router = router.route_service("/data.json", ServeFile::new(path));
    }

    router.fallback(not_found)
}

/// Wrap routes in the middleware stack. Outermost first.
pub fn with_layers(router: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    let router = router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(panic_response)),
    );
    cors_headers(router)
}

fn now_watching() -> MethodRouter<Arc<AppState>> {
    get(get_watching)
        .post(post_watching)
        .options(preflight)
        .fallback(method_not_allowed)
}

async fn get_watching(State(state): State<Arc<AppState>>) -> Json<WatchingRecord> {
    Json(state.publisher.read().await)
}

/// The body is taken raw so malformed JSON becomes a validation error
/// after the credential check, not an extractor rejection before it.
async fn post_watching(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PublishResponse>, ServerError> {
    let credential = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    tracing::debug!(
        has_auth = credential.is_some(),
        body_len = body.len(),
        "publish request received"
    );

    let candidate: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let published = state.publisher.write(&candidate, credential).await?;

    Ok(Json(PublishResponse {
        success: true,
        message: "Updated successfully",
        data: published.record,
    }))
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}

async fn not_found() -> ServerError {
    ServerError::NotFound
}

async fn get_health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
