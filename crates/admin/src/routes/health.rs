//! Health check route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::instrument;

use crate::state::AppState;

/// `GET /health` - liveness.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /health/ready` - readiness; pings Firestore.
#[instrument(skip(state))]
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.firestore().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
