use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

/// Default chat model on the hosting platform.
const DEFAULT_CHAT_MODEL: &str = "openai/gpt-oss-120b";
/// Default embedding model on the embedding hub.
const DEFAULT_EMBEDDING_MODEL: &str = "google/embeddinggemma-300m";

const DEFAULT_CHAT_BASE_URL: &str = "https://api.groq.com/openai";
const DEFAULT_EMBEDDING_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Fixed retrieval tuning: chunk window, overlap, and top-k.
const DEFAULT_CHUNK_SIZE: usize = 500;
const DEFAULT_CHUNK_OVERLAP: usize = 100;
const DEFAULT_TOP_K: usize = 4;

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub index_path: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let data_dir = discover_data_dir();
        Self::with_data_dir(data_dir)
    }

    /// Root all paths under an explicit data directory (used by tests).
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        let upload_dir = data_dir.join("uploaded_docs");
        let index_path = data_dir.join("rag_index.db");
        let log_dir = data_dir.join("logs");

        for dir in [&data_dir, &upload_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            data_dir,
            upload_dir,
            index_path,
            log_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("CRAMKIT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if cfg!(debug_assertions) {
        return PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
    }

    if cfg!(target_os = "windows") {
        let base = env::var("LOCALAPPDATA")
            .unwrap_or_else(|_| env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string()));
        return PathBuf::from(base).join("Cramkit");
    }

    if cfg!(target_os = "macos") {
        return home_dir()
            .join("Library")
            .join("Application Support")
            .join("Cramkit");
    }

    home_dir().join(".local").join("share").join("cramkit")
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| Path::new(".").to_path_buf())
}

/// Runtime settings resolved once at startup.
///
/// Both platform tokens are mandatory; everything else has a default
/// matching the retrieval pipeline's fixed tuning.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Token for the chat-model hosting platform.
    pub chat_api_key: String,
    /// Token for the embedding hub.
    pub embedding_api_token: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub chat_base_url: String,
    pub embedding_base_url: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let chat_api_key = match env::var("GROQ_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => bail!("GROQ_API_KEY is not set; a model-hosting token is required"),
        };
        let embedding_api_token = match env::var("HF_API_TOKEN") {
            Ok(token) if !token.trim().is_empty() => token,
            _ => bail!("HF_API_TOKEN is not set; an embedding-hub token is required"),
        };

        Ok(Settings {
            chat_api_key,
            embedding_api_token,
            chat_model: env::var("CRAMKIT_CHAT_MODEL")
                .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
            embedding_model: env::var("CRAMKIT_EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
            chat_base_url: env::var("CRAMKIT_CHAT_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_CHAT_BASE_URL.to_string()),
            embedding_base_url: env::var("CRAMKIT_EMBEDDING_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_BASE_URL.to_string()),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
        })
    }

    /// Settings for tests: no live credentials, default tuning.
    pub fn for_tests() -> Self {
        Settings {
            chat_api_key: String::new(),
            embedding_api_token: String::new(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            embedding_base_url: DEFAULT_EMBEDDING_BASE_URL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_rooted_under_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::with_data_dir(tmp.path().to_path_buf());

        assert!(paths.upload_dir.starts_with(tmp.path()));
        assert!(paths.index_path.starts_with(tmp.path()));
        assert!(paths.upload_dir.is_dir());
        assert!(paths.log_dir.is_dir());
    }

    #[test]
    fn tuning_defaults_match_pipeline() {
        let settings = Settings::for_tests();
        assert_eq!(settings.chunk_size, 500);
        assert_eq!(settings.chunk_overlap, 100);
        assert_eq!(settings.top_k, 4);
    }
}
