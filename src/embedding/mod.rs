//! Embedding adapter.
//!
//! Wraps the hosted embedding backend and applies the role-specific
//! prefix templates the embedding model was trained with. Documents and
//! queries render differently on purpose, so the same raw text embeds
//! to different vectors depending on role.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::core::errors::ApiError;

/// Which side of the retrieval pair a text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingRole {
    Document,
    Query,
}

/// Render the prompt actually sent to the embedding backend.
pub fn render_embedding_input(role: EmbeddingRole, text: &str) -> String {
    match role {
        EmbeddingRole::Document => format!("title: none | text: {}", text),
        EmbeddingRole::Query => format!("task: search result | query: {}", text),
    }
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed texts with the document-role prefix.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;

    /// Embed a single text with the query-role prefix.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ApiError>;
}

/// Embedding client for the Hugging Face Inference API.
#[derive(Clone)]
pub struct HfEmbedder {
    base_url: String,
    model: String,
    token: String,
    client: Client,
}

impl HfEmbedder {
    pub fn new(base_url: &str, model: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            token: token.to_string(),
            client: Client::new(),
        }
    }

    /// One feature-extraction call for a batch of already-rendered inputs.
    ///
    /// No retries: a backend failure propagates to the caller.
    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        let url = format!(
            "{}/models/{}/pipeline/feature-extraction",
            self.base_url, self.model
        );

        let body = json!({
            "inputs": inputs,
            "options": { "wait_for_model": true },
        });

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!(
                "embedding backend error ({}): {}",
                status, text
            )));
        }

        let mut vectors: Vec<Vec<f32>> = res.json().await.map_err(ApiError::internal)?;

        if vectors.len() != inputs.len() {
            return Err(ApiError::Internal(format!(
                "embedding backend returned {} vectors for {} inputs",
                vectors.len(),
                inputs.len()
            )));
        }

        for vector in &mut vectors {
            normalize_in_place(vector);
        }

        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for HfEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        let rendered: Vec<String> = texts
            .iter()
            .map(|t| render_embedding_input(EmbeddingRole::Document, t))
            .collect();
        self.request(&rendered).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        let rendered = [render_embedding_input(EmbeddingRole::Query, text)];
        let mut vectors = self.request(&rendered).await?;
        vectors
            .pop()
            .ok_or_else(|| ApiError::Internal("embedding backend returned no vector".to_string()))
    }
}

/// Scale a vector to unit norm. Zero vectors are left untouched.
fn normalize_in_place(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
