pub mod engine;
pub mod prompts;

pub use engine::{ChatTurn, RagEngine, RagError};
