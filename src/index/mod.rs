pub mod store;

pub use store::{ChunkSearchResult, StoredChunk, VectorIndex};
