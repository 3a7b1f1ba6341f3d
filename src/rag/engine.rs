//! Retrieval-augmented responder and quiz generator.
//!
//! The engine owns the two pieces of session state: the current vector
//! index handle and the chat transcript. Ingestion installs a fresh
//! index handle (swap-on-write); readers clone the `Arc` and keep
//! searching the snapshot they started with.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::core::errors::ApiError;
use crate::embedding::Embedder;
use crate::index::{ChunkSearchResult, VectorIndex};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::rag::prompts;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("knowledge base has not been built yet")]
    NotInitialized,
    #[error("retrieval failed: {0}")]
    Retrieval(ApiError),
    #[error("generation failed: {0}")]
    Generation(ApiError),
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::NotInitialized => ApiError::BadRequest(err.to_string()),
            RagError::Retrieval(inner) | RagError::Generation(inner) => inner,
        }
    }
}

/// One (question, answer) exchange in the in-memory transcript.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}

pub struct RagEngine {
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LlmProvider>,
    chat_model: String,
    top_k: usize,
    index: RwLock<Option<Arc<VectorIndex>>>,
    transcript: RwLock<Vec<ChatTurn>>,
}

impl RagEngine {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LlmProvider>,
        chat_model: String,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            llm,
            chat_model,
            top_k,
            index: RwLock::new(None),
            transcript: RwLock::new(Vec::new()),
        }
    }

    /// Swap in a freshly built index handle.
    pub async fn install_index(&self, index: Arc<VectorIndex>) {
        *self.index.write().await = Some(index);
    }

    pub async fn has_index(&self) -> bool {
        self.index.read().await.is_some()
    }

    /// Total chunks in the current index, if one is installed.
    pub async fn chunk_count(&self) -> Result<usize, ApiError> {
        let Some(index) = self.index.read().await.clone() else {
            return Ok(0);
        };
        index.count().await
    }

    async fn current_index(&self) -> Result<Arc<VectorIndex>, RagError> {
        self.index
            .read()
            .await
            .clone()
            .ok_or(RagError::NotInitialized)
    }

    /// Top-k chunks for a query, most-similar-first.
    async fn retrieve(&self, query: &str) -> Result<Vec<ChunkSearchResult>, RagError> {
        let index = self.current_index().await?;
        let query_embedding = self
            .embedder
            .embed_query(query)
            .await
            .map_err(RagError::Retrieval)?;

        index
            .search(&query_embedding, self.top_k)
            .await
            .map_err(RagError::Retrieval)
    }

    /// Answer a question from the indexed course material.
    pub async fn answer(&self, question: &str) -> Result<String, RagError> {
        let results = self.retrieve(question).await?;
        let context = join_chunks(&results);

        let request = ChatRequest::new(vec![
            ChatMessage::system(prompts::SYSTEM_PROMPT_CHAT),
            ChatMessage::user(prompts::render_chat_prompt(&context, question)),
        ]);

        let answer = self
            .llm
            .chat(request, &self.chat_model)
            .await
            .map_err(RagError::Generation)?;

        self.transcript.write().await.push(ChatTurn {
            question: question.to_string(),
            answer: answer.clone(),
        });

        Ok(answer)
    }

    /// Generate `count` quiz items grounded in the indexed material.
    ///
    /// A blank topic means "review the whole course". Zero retrieved
    /// chunks is a soft failure: the sentinel string comes back instead
    /// of a model call.
    pub async fn generate_quiz(&self, topic: &str, count: u8) -> Result<String, RagError> {
        let query = if topic.trim().is_empty() {
            prompts::DEFAULT_QUIZ_QUERY
        } else {
            topic
        };

        let results = self.retrieve(query).await?;
        if results.is_empty() {
            return Ok(prompts::NO_DATA_SENTINEL.to_string());
        }

        let context = join_chunks(&results);
        let request = ChatRequest::new(vec![
            ChatMessage::system(prompts::SYSTEM_PROMPT_QUIZ),
            ChatMessage::user(prompts::render_quiz_prompt(&context, count)),
        ]);

        self.llm
            .chat(request, &self.chat_model)
            .await
            .map_err(RagError::Generation)
    }

    pub async fn transcript(&self) -> Vec<ChatTurn> {
        self.transcript.read().await.clone()
    }

    pub async fn clear_transcript(&self) {
        self.transcript.write().await.clear();
    }
}

/// Concatenate chunk texts in retrieval-rank order.
///
/// No re-ranking and no deduplication: a passage retrieved twice via
/// overlapping chunks appears twice.
fn join_chunks(results: &[ChunkSearchResult]) -> String {
    results
        .iter()
        .map(|r| r.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
