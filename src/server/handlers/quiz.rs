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
pub struct QuizBody {
    /// Topic to focus on; blank means "review the whole course".
    #[serde(default)]
    pub topic: String,
    #[serde(default = "default_count")]
    pub count: u8,
}

fn default_count() -> u8 {
    5
}

pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QuizBody>,
) -> Result<impl IntoResponse, ApiError> {
    if !(1..=10).contains(&body.count) {
        return Err(ApiError::BadRequest(
            "count must be between 1 and 10".to_string(),
        ));
    }

    let quiz = state
        .engine
        .generate_quiz(&body.topic, body.count)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(json!({ "quiz": normalize_math_delimiters(&quiz) })))
}
