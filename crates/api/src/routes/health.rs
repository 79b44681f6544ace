//! Health check handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use crate::state::AppState;

/// Liveness: the process is up and serving.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Readiness: Postgres and Redis both answer.
#[instrument(skip_all)]
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let postgres = sqlx::query("SELECT 1").execute(state.pool()).await.is_ok();

    let mut conn = state.redis();
    let redis = redis::cmd("PING")
        .query_async::<String>(&mut conn)
        .await
        .is_ok();

    let status = if postgres && redis {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "postgres": postgres,
            "redis": redis,
        })),
    )
}
