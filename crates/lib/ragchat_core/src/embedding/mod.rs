//! Embedding module: text embedding generation for chunks and questions.
//!
//! # Public API
//!
//! - [`Embedder::embed_documents`]: embed a batch of chunk texts
//! - [`Embedder::embed_query`]: embed a single question
//! - [`config::EmbeddingConfig`]: resolved embedding configuration
//!
//! # Providers
//!
//! - `"openai"`: OpenAI-compatible API (`text-embedding-3-small`)
//! - `"ollama"`: Ollama local API (`nomic-embed-text`)
//! - `"local"`: Deterministic FNV-1a hash (offline, no external deps)

pub mod config;
pub mod local;
pub mod ollama;
pub mod openai;
pub mod provider;

use reqwest::Client;
use thiserror::Error;

use config::EmbeddingConfig;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Embeds texts with the configured provider.
///
/// Holds one HTTP client for the lifetime of the embedder so connections are
/// reused across ingestion batches and questions.
#[derive(Debug, Clone)]
pub struct Embedder {
    client: Client,
    config: EmbeddingConfig,
}

impl Embedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    /// Embed chunk texts, one vector per input in input order.
    pub async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        provider::embed_batch(&self.client, &self.config, texts).await
    }

    /// Embed a single question.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let texts = vec![text.to_string()];
        provider::embed_batch(&self.client, &self.config, &texts)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Provider("No embedding result returned".to_string()))
    }
}
