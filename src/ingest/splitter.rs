//! Text splitting into overlapping chunks.
//!
//! Character-window splitter: fixed chunk size, fixed step of
//! `size - overlap`, so consecutive chunks of the same document share
//! exactly the configured overlap. Char-based indexing keeps splits off
//! multi-byte boundaries.

use super::loader::Document;

/// A bounded-length segment of a source document.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub content: String,
    pub source: String,
    pub chunk_index: usize,
}

pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// `chunk_overlap` must be smaller than `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        debug_assert!(chunk_overlap < chunk_size);
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        let chars: Vec<char> = document.text.chars().collect();
        let total = chars.len();

        let mut chunks = Vec::new();
        if total == 0 {
            return chunks;
        }

        let step = self.chunk_size.saturating_sub(self.chunk_overlap).max(1);
        let mut start = 0;
        let mut chunk_index = 0;

        while start < total {
            let end = (start + self.chunk_size).min(total);
            let content: String = chars[start..end].iter().collect();

            chunks.push(Chunk {
                content,
                source: document.source.clone(),
                chunk_index,
            });

            if end == total {
                break;
            }
            start += step;
            chunk_index += 1;
        }

        chunks
    }
}
