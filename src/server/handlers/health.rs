use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let index_ready = state.engine.has_index().await;
    let chunk_count = state.engine.chunk_count().await.unwrap_or(0);
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0);

    Ok(Json(json!({
        "status": "ok",
        "index_ready": index_ready,
        "chunk_count": chunk_count,
        "started_at": state.started_at.to_rfc3339(),
        "uptime_secs": uptime_secs,
    })))
}
