//! OpenAI embedding provider.
//!
//! Calls an OpenAI-compatible embeddings API (`{base}/embeddings`) with retry
//! logic (max 3 attempts, exponential backoff). A whole batch goes out in one
//! request; results are re-ordered by their `index` field.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, sleep};

use super::EmbeddingError;
use super::config::EmbeddingConfig;

const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Largest number of inputs sent in a single request.
const MAX_BATCH: usize = 256;

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    data: Vec<OpenAIEmbedding>,
}

#[derive(Deserialize)]
struct OpenAIEmbedding {
    index: usize,
    embedding: Vec<f64>,
}

/// Only the `text-embedding-3` family accepts a `dimensions` parameter.
fn requested_dimensions(config: &EmbeddingConfig) -> Option<usize> {
    config
        .model
        .starts_with("text-embedding-3")
        .then_some(config.dimensions)
}

/// Embed one request-sized slice via OpenAI with retry.
async fn embed_chunk(
    client: &Client,
    config: &EmbeddingConfig,
    texts: &[String],
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let api_key = config.openai_api_key.as_deref().ok_or_else(|| {
        EmbeddingError::Config("OPENAI_API_KEY is required for openai provider".to_string())
    })?;
    let url = format!("{}/embeddings", config.openai_base_url.trim_end_matches('/'));

    let mut last_error = None;

    for attempt in 0..MAX_RETRY_ATTEMPTS {
        let result = client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&OpenAIRequest {
                model: &config.model,
                input: texts,
                dimensions: requested_dimensions(config),
            })
            .send()
            .await;

        match result {
            Ok(resp) => {
                if !resp.status().is_success() {
                    let status = resp.status();
                    let body = resp
                        .text()
                        .await
                        .unwrap_or_else(|_| "<no body>".to_string());
                    last_error = Some(EmbeddingError::Provider(format!(
                        "OpenAI embeddings failed: {status} {body}"
                    )));
                } else {
                    let data: OpenAIResponse = resp.json().await.map_err(|e| {
                        EmbeddingError::Provider(format!("OpenAI response parse error: {e}"))
                    })?;
                    return collect_ordered(data, texts.len());
                }
            }
            Err(e) => {
                last_error = Some(EmbeddingError::Provider(format!(
                    "OpenAI request failed: {e}"
                )));
            }
        }

        // Exponential backoff before retry
        if attempt + 1 < MAX_RETRY_ATTEMPTS {
            let backoff = Duration::from_secs(2u64.pow(attempt + 1));
            sleep(backoff).await;
        }
    }

    Err(last_error.unwrap_or_else(|| {
        EmbeddingError::Provider(format!(
            "Failed to embed after {MAX_RETRY_ATTEMPTS} attempts"
        ))
    }))
}

fn collect_ordered(
    response: OpenAIResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if response.data.len() != expected {
        return Err(EmbeddingError::Provider(format!(
            "OpenAI returned {} embeddings for {expected} inputs",
            response.data.len()
        )));
    }

    let mut data = response.data;
    data.sort_by_key(|d| d.index);
    Ok(data
        .into_iter()
        .map(|d| d.embedding.into_iter().map(|v| v as f32).collect())
        .collect())
}

/// Embed a batch of texts via OpenAI.
pub async fn embed_batch(
    client: &Client,
    config: &EmbeddingConfig,
    texts: &[String],
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut results = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(MAX_BATCH) {
        results.extend(embed_chunk(client, config, chunk).await?);
    }
    Ok(results)
}
