//! JSON routes

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use super::WebState;

fn json_error(status: StatusCode, message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({ "error": message })))
}

/// The current snapshot, byte for byte.
pub async fn get_usage(State(state): State<Arc<WebState>>) -> Response {
    match state.source.load_raw().await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("GET /api/usage: {}", e);
            json_error(StatusCode::SERVICE_UNAVAILABLE, &e.to_string()).into_response()
        }
    }
}

pub async fn healthz() -> &'static str {
    "ok"
}
