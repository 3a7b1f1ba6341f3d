use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::server::handlers::utils::normalize_math_delimiters;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatBody>,
) -> Result<impl IntoResponse, ApiError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let answer = state.engine.answer(message).await.map_err(ApiError::from)?;
    let answer = normalize_math_delimiters(&answer);
    let transcript_length = state.engine.transcript().await.len();

    Ok(Json(json!({
        "answer": answer,
        "transcript_length": transcript_length,
    })))
}

pub async fn get_history(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let transcript = state.engine.transcript().await;
    Ok(Json(json!({ "transcript": transcript })))
}

pub async fn clear_history(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    state.engine.clear_transcript().await;
    Ok(Json(json!({ "status": "cleared" })))
}
