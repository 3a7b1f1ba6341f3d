//! End-to-end retrieval flow: real splitter, real SQLite index, real
//! engine, with deterministic fakes standing in for the hosted
//! embedding and chat backends.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use cramkit_backend::config::Settings;
use cramkit_backend::core::errors::ApiError;
use cramkit_backend::embedding::Embedder;
use cramkit_backend::ingest;
use cramkit_backend::llm::{ChatRequest, LlmProvider};
use cramkit_backend::rag::RagEngine;

/// Deterministic embedder: vector derived from byte histogram, so
/// related texts land near each other without any network call.
struct FakeEmbedder;

fn pseudo_embedding(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; 16];
    for (i, b) in text.bytes().enumerate() {
        v[i % 16] += b as f32;
    }
    v
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        Ok(texts.iter().map(|t| pseudo_embedding(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        Ok(pseudo_embedding(text))
    }
}

/// Canned chat model that records every request it receives.
struct RecordingLlm {
    response: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl RecordingLlm {
    fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmProvider for RecordingLlm {
    fn name(&self) -> &str {
        "recording"
    }

    async fn chat(&self, request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

/// Count n in 1..=10 for which both `Qn:` and `An:` labels appear.
fn count_label_pairs(text: &str) -> usize {
    (1..=10)
        .filter(|n| text.contains(&format!("Q{}:", n)) && text.contains(&format!("A{}:", n)))
        .count()
}

async fn ingest_course_note(
    upload_dir: &std::path::Path,
    index_path: &std::path::Path,
) -> Arc<cramkit_backend::index::VectorIndex> {
    std::fs::write(
        upload_dir.join("relations.txt"),
        "A set R on set S is an equivalence relation if reflexive, symmetric, transitive.",
    )
    .unwrap();

    let (index, report) = ingest::build_index(
        upload_dir,
        index_path,
        &Settings::for_tests(),
        &FakeEmbedder,
        &["relations.txt".to_string()],
    )
    .await
    .unwrap();

    assert_eq!(report.loaded, vec!["relations.txt".to_string()]);
    assert!(report.skipped.is_empty());
    assert!(report.chunk_count >= 1);

    index
}

#[tokio::test]
async fn ingest_then_answer_produces_grounded_reply_and_transcript() {
    let tmp = tempfile::tempdir().unwrap();
    let index = ingest_course_note(tmp.path(), &tmp.path().join("index.db")).await;

    let llm = Arc::new(RecordingLlm::new(
        "等價關係是滿足自反、對稱、遞移三性質的關係。",
    ));
    let engine = RagEngine::new(
        Arc::new(FakeEmbedder),
        llm.clone(),
        "test-model".to_string(),
        4,
    );
    engine.install_index(index).await;

    let answer = engine.answer("什麼是等價關係？").await.unwrap();
    assert!(!answer.is_empty());

    let transcript = engine.transcript().await;
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].question, "什麼是等價關係？");

    // The prompt handed to the model must carry the retrieved material.
    let requests = llm.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let user_message = &requests[0].messages[1];
    assert_eq!(user_message.role, "user");
    assert!(user_message.content.contains("equivalence relation"));
    assert!(user_message.content.contains("什麼是等價關係？"));
}

#[tokio::test]
async fn quiz_on_populated_index_yields_requested_label_pairs() {
    let tmp = tempfile::tempdir().unwrap();
    let index = ingest_course_note(tmp.path(), &tmp.path().join("index.db")).await;

    let llm = Arc::new(RecordingLlm::new(
        "Q1: 何謂自反性？\nA1: 每個元素都與自己有關係。\n\n\
         Q2: 何謂對稱性？\nA2: aRb 則 bRa。\n\n\
         Q3: 何謂遞移性？\nA3: aRb 且 bRc 則 aRc。",
    ));
    let engine = RagEngine::new(
        Arc::new(FakeEmbedder),
        llm.clone(),
        "test-model".to_string(),
        4,
    );
    engine.install_index(index).await;

    let quiz = engine.generate_quiz("equivalence relation", 3).await.unwrap();
    assert_eq!(count_label_pairs(&quiz), 3);

    // The quiz prompt asked for exactly three items.
    let requests = llm.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].messages[1].content.contains("設計 3 題"));
}
