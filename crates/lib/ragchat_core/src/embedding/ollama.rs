//! Ollama embeddings (`POST {base}/api/embeddings`).
//!
//! The endpoint takes one prompt per call, so batches are sent one text at a
//! time in order.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::EmbeddingError;
use super::config::EmbeddingConfig;

#[derive(Serialize)]
struct EmbedPrompt<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedReply {
    #[serde(default)]
    embedding: Vec<f64>,
}

fn provider_error(context: &str, e: impl std::fmt::Display) -> EmbeddingError {
    EmbeddingError::Provider(format!("ollama {context}: {e}"))
}

/// Narrow the reply to `f32` and check it has the configured width.
fn into_vector(reply: EmbedReply, dimensions: usize) -> Result<Vec<f32>, EmbeddingError> {
    if reply.embedding.len() != dimensions {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dimensions,
            actual: reply.embedding.len(),
        });
    }
    Ok(reply.embedding.into_iter().map(|v| v as f32).collect())
}

pub async fn embed_batch(
    client: &Client,
    config: &EmbeddingConfig,
    texts: &[String],
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let url = format!("{}/api/embeddings", config.ollama_base_url.trim_end_matches('/'));
    let mut vectors = Vec::with_capacity(texts.len());

    for text in texts {
        let resp = client
            .post(&url)
            .json(&EmbedPrompt {
                model: &config.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| provider_error("request", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(provider_error("status", format!("{status} {body}")));
        }

        let reply: EmbedReply = resp.json().await.map_err(|e| provider_error("decode", e))?;
        vectors.push(into_vector(reply, config.dimensions)?);
    }

    Ok(vectors)
}
