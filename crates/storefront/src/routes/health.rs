//! Health check handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::json;
use tracing::instrument;

use crate::state::AppState;

/// `GET /health` - liveness. Always succeeds while the process is up.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /health/ready` - readiness. Pings Firestore so load balancers stop
/// routing when the backing store is unreachable.
#[instrument(skip(state))]
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    match state.firestore().ping().await {
        Ok(()) => Ok(Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            ))
        }
    }
}
