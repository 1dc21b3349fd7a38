//! Provider dispatch: routes embedding requests to the correct provider.

use reqwest::Client;

use super::config::EmbeddingConfig;
use super::{EmbeddingError, local, ollama, openai};

/// Generate embeddings for a batch of texts.
///
/// Dispatches based on `config.provider`:
/// - `"openai"` → OpenAI API with retry
/// - `"ollama"` → Ollama local API
/// - `"local"` → deterministic FNV hash
pub async fn embed_batch(
    client: &Client,
    config: &EmbeddingConfig,
    texts: &[String],
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    match config.provider.as_str() {
        "local" => Ok(local::embed_batch(texts, config.dimensions)),
        "ollama" => ollama::embed_batch(client, config, texts).await,
        "openai" => openai::embed_batch(client, config, texts).await,
        other => Err(EmbeddingError::UnsupportedProvider(other.to_string())),
    }
}
