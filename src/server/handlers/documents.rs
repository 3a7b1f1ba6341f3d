//! File upload and ingestion trigger.

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::ingest;
use crate::state::AppState;

/// Accept a multipart batch of course files, copy them into the upload
/// directory, rebuild the vector index, and install the fresh handle.
pub async fn upload_documents(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut saved = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(sanitize_file_name) else {
            continue;
        };
        if file_name.is_empty() {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {}", e)))?;

        let dest = state.paths.upload_dir.join(&file_name);
        tokio::fs::write(&dest, &data)
            .await
            .map_err(ApiError::internal)?;
        tracing::info!("Saved upload {} ({} bytes)", file_name, data.len());
        saved.push(file_name);
    }

    let (index, report) = ingest::build_index(
        &state.paths.upload_dir,
        &state.paths.index_path,
        &state.settings,
        state.embedder.as_ref(),
        &saved,
    )
    .await
    .map_err(ApiError::from)?;

    state.engine.install_index(index).await;

    Ok(Json(json!({ "status": "ok", "report": report })))
}

/// Keep only the final path component of a client-supplied filename.
fn sanitize_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string()
}
