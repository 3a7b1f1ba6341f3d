//! SQLite-backed vector index.
//!
//! Stores chunk text + metadata in SQLite, with serialized embeddings
//! for brute-force cosine similarity search. The index is owned
//! exclusively by this process and rebuilt wholesale on each ingestion;
//! there is no incremental update or deletion path.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use crate::core::errors::ApiError;

/// A stored chunk with its source metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique chunk identifier.
    pub chunk_id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Source filename the chunk was split from.
    pub source: String,
    /// Optional metadata (JSON).
    pub metadata: Option<serde_json::Value>,
}

/// Result of a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSearchResult {
    pub chunk: StoredChunk,
    /// Similarity score (higher = better).
    pub score: f32,
}

pub struct VectorIndex {
    pool: SqlitePool,
    #[allow(dead_code)]
    path: PathBuf,
}

impl VectorIndex {
    /// Open (or create) the index file at the given path.
    pub async fn open(path: PathBuf) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        let index = Self { pool, path };
        index.init_schema().await?;
        Ok(index)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chunks (
                chunk_id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT '',
                metadata TEXT DEFAULT '{}',
                embedding BLOB,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(())
    }

    /// Replace the whole index with the given chunks in one transaction.
    ///
    /// An in-flight reader holding the old pool keeps seeing a complete
    /// snapshot until the transaction commits.
    pub async fn rebuild(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::internal)?;

        sqlx::query("DELETE FROM chunks")
            .execute(&mut *tx)
            .await
            .map_err(ApiError::internal)?;

        for (chunk, embedding) in &items {
            let blob = Self::serialize_embedding(embedding);
            let metadata_str = chunk
                .metadata
                .as_ref()
                .map(|m| serde_json::to_string(m).unwrap_or_default())
                .unwrap_or_else(|| "{}".to_string());

            sqlx::query(
                "INSERT OR REPLACE INTO chunks (chunk_id, content, source, metadata, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&chunk.chunk_id)
            .bind(&chunk.content)
            .bind(&chunk.source)
            .bind(&metadata_str)
            .bind(&blob)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::internal)?;
        }

        tx.commit().await.map_err(ApiError::internal)?;
        tracing::info!("Rebuilt vector index with {} chunks", items.len());
        Ok(())
    }

    /// Top-k most-similar chunks for the query embedding.
    pub async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ChunkSearchResult>, ApiError> {
        let rows = sqlx::query("SELECT chunk_id, content, source, metadata, embedding FROM chunks")
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        let mut scored: Vec<ChunkSearchResult> = rows
            .iter()
            .filter_map(|row| {
                let embedding_bytes: Vec<u8> = row.get("embedding");
                if embedding_bytes.is_empty() {
                    return None;
                }
                let stored_emb = Self::deserialize_embedding(&embedding_bytes);
                let score = Self::cosine_similarity(query_embedding, &stored_emb);

                let metadata_str: String = row.get("metadata");
                let metadata = serde_json::from_str(&metadata_str).ok();

                Some(ChunkSearchResult {
                    chunk: StoredChunk {
                        chunk_id: row.get("chunk_id"),
                        content: row.get("content"),
                        source: row.get("source"),
                        metadata,
                    },
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);

        Ok(scored)
    }

    /// Total number of stored chunks.
    pub async fn count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        Ok(count as usize)
    }

    /// Serialize embedding to bytes (little-endian f32).
    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    /// Compute cosine similarity between two vectors.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_index() -> VectorIndex {
        let path = std::env::temp_dir().join(format!("cramkit-index-test-{}.db", uuid::Uuid::new_v4()));
        VectorIndex::open(path).await.unwrap()
    }

    fn chunk(id: &str, content: &str) -> StoredChunk {
        StoredChunk {
            chunk_id: id.to_string(),
            content: content.to_string(),
            source: "notes.txt".to_string(),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn rebuild_and_search() {
        let index = test_index().await;

        index
            .rebuild(vec![
                (chunk("c1", "equivalence relations"), vec![1.0, 0.0, 0.0]),
                (chunk("c2", "graph traversal"), vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();

        assert_eq!(index.count().await.unwrap(), 2);

        let results = index.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.chunk_id, "c1");
        assert!(results[0].score > 0.99);
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn rebuild_replaces_previous_contents() {
        let index = test_index().await;

        index
            .rebuild(vec![(chunk("old", "stale"), vec![1.0, 0.0])])
            .await
            .unwrap();
        index
            .rebuild(vec![
                (chunk("new1", "fresh"), vec![1.0, 0.0]),
                (chunk("new2", "fresh too"), vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        assert_eq!(index.count().await.unwrap(), 2);
        let results = index.search(&[1.0, 0.0], 10).await.unwrap();
        assert!(results.iter().all(|r| r.chunk.chunk_id != "old"));
    }

    #[tokio::test]
    async fn search_on_empty_index_returns_nothing() {
        let index = test_index().await;
        let results = index.search(&[1.0, 0.0], 4).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn search_truncates_to_limit() {
        let index = test_index().await;

        let items = (0..6)
            .map(|i| (chunk(&format!("c{}", i), "text"), vec![1.0, i as f32 / 10.0]))
            .collect();
        index.rebuild(items).await.unwrap();

        let results = index.search(&[1.0, 0.0], 4).await.unwrap();
        assert_eq!(results.len(), 4);
    }
}
