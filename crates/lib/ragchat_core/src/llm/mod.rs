//! Chat models that turn a filled-in prompt into an answer.
//!
//! # Providers
//!
//! - `"openai"`: OpenAI-compatible chat completions API
//! - `"ollama"`: Ollama local chat API

pub mod ollama;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LlmConfig;

pub use ollama::OllamaChatModel;
pub use openai::OpenAiChatModel;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Model returned no answer")]
    EmptyResponse,
}

/// A language model that completes a single prompt.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send `prompt` as one user message and return the reply text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier, for logs.
    fn name(&self) -> &str;
}

/// Build the chat model described by `config`.
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn ChatModel>, LlmError> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiChatModel::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaChatModel::new(config))),
        other => Err(LlmError::UnsupportedProvider(other.to_string())),
    }
}
