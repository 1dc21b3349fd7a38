//! Embedding configuration resolution.
//!
//! | Variable               | Default                                          |
//! |------------------------|--------------------------------------------------|
//! | `EMBEDDING_PROVIDER`   | `openai` if `OPENAI_API_KEY` is set, else `local` |
//! | `EMBEDDING_MODEL`      | provider default (see [`default_model`])         |
//! | `EMBEDDING_DIMENSIONS` | provider default (see [`default_dimensions`])    |
//! | `OPENAI_API_KEY`       | unset                                            |
//! | `OPENAI_BASE_URL`      | `https://api.openai.com/v1`                      |
//! | `OLLAMA_BASE_URL`      | `http://localhost:11434`                         |

use crate::config::{DEFAULT_OLLAMA_BASE_URL, DEFAULT_OPENAI_BASE_URL, parse_or};

/// Resolved configuration for which embedding provider/model to use.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Provider name: `"openai"`, `"ollama"`, or `"local"`.
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    /// Base URL of an OpenAI-compatible API (without `/embeddings`).
    pub openai_base_url: String,
    /// Ollama API base URL.
    pub ollama_base_url: String,
    /// OpenAI API key (required when provider is `"openai"`).
    pub openai_api_key: Option<String>,
}

/// Default model name for a provider.
pub fn default_model(provider: &str) -> &'static str {
    match provider {
        "openai" => "text-embedding-3-small",
        "ollama" => "nomic-embed-text",
        _ => "local-fnv",
    }
}

/// Default vector width for a provider.
pub fn default_dimensions(provider: &str) -> usize {
    match provider {
        "openai" => 1536,
        "ollama" => 768,
        _ => 384,
    }
}

impl EmbeddingConfig {
    /// Offline configuration using the deterministic local provider.
    pub fn local(dimensions: usize) -> Self {
        Self {
            provider: "local".to_string(),
            model: default_model("local").to_string(),
            dimensions,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            openai_api_key: None,
        }
    }

    /// Resolve through `get`, which returns `None` for unset variables.
    ///
    /// Auto-selects `"openai"` if `OPENAI_API_KEY` is set and no explicit
    /// provider was configured.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = get("OPENAI_API_KEY");

        let provider = get("EMBEDDING_PROVIDER").unwrap_or_else(|| {
            if openai_api_key.is_some() {
                "openai".to_string()
            } else {
                "local".to_string()
            }
        });

        let model = get("EMBEDDING_MODEL").unwrap_or_else(|| default_model(&provider).to_string());
        let dimensions = parse_or(
            "EMBEDDING_DIMENSIONS",
            get("EMBEDDING_DIMENSIONS"),
            default_dimensions(&provider),
        );

        Self {
            provider,
            model,
            dimensions,
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ollama_base_url: get("OLLAMA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string()),
            openai_api_key,
        }
    }
}
