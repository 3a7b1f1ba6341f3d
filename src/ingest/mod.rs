//! Corpus ingestion.
//!
//! Loads uploaded files, splits them into overlapping chunks, embeds the
//! chunks with the document role, and rebuilds the on-disk vector index
//! wholesale. Per-file failures are skipped and reported; only an empty
//! batch or a fully-failed batch aborts.

pub mod loader;
pub mod splitter;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Settings;
use crate::core::errors::ApiError;
use crate::embedding::Embedder;
use crate::index::{StoredChunk, VectorIndex};

use loader::{load_file, LoadOutcome};
use splitter::TextSplitter;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no files were provided")]
    EmptyInput,
    #[error("no documents could be loaded from the provided files")]
    NoDocumentsLoaded,
    #[error("embedding failed: {0}")]
    Embedding(ApiError),
    #[error("index write failed: {0}")]
    Index(ApiError),
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::EmptyInput | IngestError::NoDocumentsLoaded => {
                ApiError::BadRequest(err.to_string())
            }
            IngestError::Embedding(inner) | IngestError::Index(inner) => inner,
        }
    }
}

/// A file that did not make it into the index, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

/// What one ingestion run actually did.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub loaded: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub chunk_count: usize,
}

/// Build a fresh vector index from the named files in the upload
/// directory, fully replacing any prior index at `index_path`.
pub async fn build_index(
    upload_dir: &Path,
    index_path: &Path,
    settings: &Settings,
    embedder: &dyn Embedder,
    file_names: &[String],
) -> Result<(Arc<VectorIndex>, IngestReport), IngestError> {
    if file_names.is_empty() {
        return Err(IngestError::EmptyInput);
    }

    let mut documents = Vec::new();
    let mut loaded = Vec::new();
    let mut skipped = Vec::new();

    for file_name in file_names {
        match load_file(upload_dir, file_name) {
            LoadOutcome::Loaded(doc) => {
                loaded.push(doc.source.clone());
                documents.push(doc);
            }
            LoadOutcome::Skipped { file, reason } => {
                tracing::warn!("Skipping {}: {}", file, reason);
                skipped.push(SkippedFile { file, reason });
            }
        }
    }

    if documents.is_empty() {
        return Err(IngestError::NoDocumentsLoaded);
    }

    let splitter = TextSplitter::new(settings.chunk_size, settings.chunk_overlap);
    let chunks: Vec<_> = documents.iter().flat_map(|doc| splitter.split(doc)).collect();

    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let embeddings = embedder
        .embed_documents(&texts)
        .await
        .map_err(IngestError::Embedding)?;

    let items: Vec<(StoredChunk, Vec<f32>)> = chunks
        .into_iter()
        .zip(embeddings)
        .map(|(chunk, embedding)| {
            (
                StoredChunk {
                    chunk_id: Uuid::new_v4().to_string(),
                    content: chunk.content,
                    source: chunk.source,
                    metadata: Some(serde_json::json!({ "chunk_index": chunk.chunk_index })),
                },
                embedding,
            )
        })
        .collect();

    let chunk_count = items.len();

    let index = VectorIndex::open(index_path.to_path_buf())
        .await
        .map_err(IngestError::Index)?;
    index.rebuild(items).await.map_err(IngestError::Index)?;

    tracing::info!(
        "Ingested {} file(s) ({} skipped) into {} chunks",
        loaded.len(),
        skipped.len(),
        chunk_count
    );

    Ok((
        Arc::new(index),
        IngestReport {
            loaded,
            skipped,
            chunk_count,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Deterministic fake embedder: vector derived from byte content.
    struct FakeEmbedder;

    fn pseudo_embedding(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; 8];
        for (i, b) in text.bytes().enumerate() {
            v[i % 8] += b as f32;
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

    fn test_settings() -> Settings {
        Settings::for_tests()
    }

    #[tokio::test]
    async fn empty_file_list_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let result = build_index(
            tmp.path(),
            &tmp.path().join("index.db"),
            &test_settings(),
            &FakeEmbedder,
            &[],
        )
        .await;

        assert!(matches!(result, Err(IngestError::EmptyInput)));
    }

    #[tokio::test]
    async fn all_skipped_files_yield_no_documents_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("image.png"), b"binary").unwrap();

        let result = build_index(
            tmp.path(),
            &tmp.path().join("index.db"),
            &test_settings(),
            &FakeEmbedder,
            &["image.png".to_string(), "missing.txt".to_string()],
        )
        .await;

        assert!(matches!(result, Err(IngestError::NoDocumentsLoaded)));
    }

    #[tokio::test]
    async fn mixed_batch_skips_and_continues() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "reflexive symmetric transitive").unwrap();

        let (index, report) = build_index(
            tmp.path(),
            &tmp.path().join("index.db"),
            &test_settings(),
            &FakeEmbedder,
            &["notes.txt".to_string(), "missing.txt".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(report.loaded, vec!["notes.txt".to_string()]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].file, "missing.txt");
        assert!(report.chunk_count >= 1);
        assert_eq!(index.count().await.unwrap(), report.chunk_count);
    }

    #[tokio::test]
    async fn reingest_replaces_index_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let index_path = tmp.path().join("index.db");
        let long_text = "equivalence relation. ".repeat(60);
        std::fs::write(tmp.path().join("big.txt"), &long_text).unwrap();
        std::fs::write(tmp.path().join("small.txt"), "one line").unwrap();

        let (index, first) = build_index(
            tmp.path(),
            &index_path,
            &test_settings(),
            &FakeEmbedder,
            &["big.txt".to_string()],
        )
        .await
        .unwrap();
        assert!(first.chunk_count > 1);
        assert_eq!(index.count().await.unwrap(), first.chunk_count);

        let (index, second) = build_index(
            tmp.path(),
            &index_path,
            &test_settings(),
            &FakeEmbedder,
            &["small.txt".to_string()],
        )
        .await
        .unwrap();
        assert_eq!(second.chunk_count, 1);
        assert_eq!(index.count().await.unwrap(), 1);
    }
}
