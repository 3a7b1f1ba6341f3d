use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::{AppPaths, Settings};
use crate::embedding::{Embedder, HfEmbedder};
use crate::index::VectorIndex;
use crate::llm::{GroqProvider, LlmProvider};
use crate::rag::RagEngine;

#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub settings: Settings,
    pub embedder: Arc<dyn Embedder>,
    pub engine: Arc<RagEngine>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build the full service graph from environment settings.
    ///
    /// Fails fast when either platform token is missing. If a persisted
    /// index exists from a previous run it is loaded and installed so
    /// queries work without re-ingesting.
    pub async fn initialize() -> anyhow::Result<Arc<Self>> {
        let paths = Arc::new(AppPaths::new());
        let settings = Settings::from_env()?;

        let embedder: Arc<dyn Embedder> = Arc::new(HfEmbedder::new(
            &settings.embedding_base_url,
            &settings.embedding_model,
            &settings.embedding_api_token,
        ));
        let llm: Arc<dyn LlmProvider> = Arc::new(GroqProvider::new(
            &settings.chat_base_url,
            &settings.chat_api_key,
        ));
        let engine = Arc::new(RagEngine::new(
            embedder.clone(),
            llm,
            settings.chat_model.clone(),
            settings.top_k,
        ));

        if paths.index_path.exists() {
            match VectorIndex::open(paths.index_path.clone()).await {
                Ok(index) => {
                    engine.install_index(Arc::new(index)).await;
                    tracing::info!("Loaded persisted vector index");
                }
                Err(err) => {
                    tracing::warn!("Failed to load persisted index: {}", err);
                }
            }
        }

        Ok(Arc::new(AppState {
            paths,
            settings,
            embedder,
            engine,
            started_at: Utc::now(),
        }))
    }
}
