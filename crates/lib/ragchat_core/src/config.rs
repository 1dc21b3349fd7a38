//! Runtime configuration resolved from environment variables.
//!
//! | Variable            | Default                      |
//! |---------------------|------------------------------|
//! | `COLLECTION_NAME`   | `rag_collection`             |
//! | `PERSIST_DIR`       | `./store_data`               |
//! | `DATABASE_URL`      | unset (file-backed store)    |
//! | `RETRIEVAL_K`       | `4`                          |
//! | `CHUNK_SIZE`        | `1000`                       |
//! | `CHUNK_OVERLAP`     | `200`                        |
//! | `LLM_PROVIDER`      | `openai`                     |
//! | `LLM_MODEL`         | `gpt-4o-mini`                |
//! | `LLM_TEMPERATURE`   | `0.0`                        |
//! | `LLM_MAX_RETRIES`   | `3`                          |
//! | `OPENAI_API_KEY`    | unset                        |
//! | `OPENAI_BASE_URL`   | `https://api.openai.com/v1`  |
//! | `OLLAMA_BASE_URL`   | `http://localhost:11434`     |
//!
//! Embedding variables are documented on [`EmbeddingConfig`].

use std::path::PathBuf;
use std::str::FromStr;

use log::warn;

use crate::embedding::config::EmbeddingConfig;

pub const DEFAULT_COLLECTION_NAME: &str = "rag_collection";
pub const DEFAULT_PERSIST_DIR: &str = "./store_data";
pub const DEFAULT_RETRIEVAL_K: usize = 4;
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Settings for the chat model that writes answers.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Provider name: `"openai"` or `"ollama"`.
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    /// Attempts per completion, including the first.
    pub max_retries: u32,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub ollama_base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: 0.0,
            max_retries: 3,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
        }
    }
}

/// Top-level configuration shared by the server and the CLI.
#[derive(Debug, Clone)]
pub struct RagConfig {
    pub collection_name: String,
    pub persist_dir: PathBuf,
    /// When set, chunks live in PostgreSQL instead of `persist_dir`.
    pub database_url: Option<String>,
    pub retrieval_k: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
}

impl RagConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai_api_key = get("OPENAI_API_KEY");
        let openai_base_url =
            get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
        let ollama_base_url =
            get("OLLAMA_BASE_URL").unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string());

        let llm = LlmConfig {
            provider: get("LLM_PROVIDER").unwrap_or_else(|| "openai".to_string()),
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            temperature: parse_or("LLM_TEMPERATURE", get("LLM_TEMPERATURE"), 0.0),
            max_retries: parse_or("LLM_MAX_RETRIES", get("LLM_MAX_RETRIES"), 3),
            openai_api_key: openai_api_key.clone(),
            openai_base_url: openai_base_url.clone(),
            ollama_base_url: ollama_base_url.clone(),
        };

        let embedding = EmbeddingConfig::from_lookup(&get);

        Self {
            collection_name: get("COLLECTION_NAME")
                .unwrap_or_else(|| DEFAULT_COLLECTION_NAME.to_string()),
            persist_dir: get("PERSIST_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PERSIST_DIR)),
            database_url: get("DATABASE_URL"),
            retrieval_k: parse_or("RETRIEVAL_K", get("RETRIEVAL_K"), DEFAULT_RETRIEVAL_K),
            chunk_size: parse_or("CHUNK_SIZE", get("CHUNK_SIZE"), DEFAULT_CHUNK_SIZE),
            chunk_overlap: parse_or("CHUNK_OVERLAP", get("CHUNK_OVERLAP"), DEFAULT_CHUNK_OVERLAP),
            embedding,
            llm,
        }
    }
}

/// Parse an optional value, falling back to `default` (with a warning) when
/// it does not parse.
pub(crate) fn parse_or<T: FromStr + Copy>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {key}={raw:?}, using default");
            default
        }),
    }
}
