//! Ollama chat provider (`/api/chat`, non-streaming).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ChatModel, LlmError};
use crate::config::LlmConfig;

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: [OllamaMessage<'a>; 1],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaReply>,
}

#[derive(Deserialize)]
struct OllamaReply {
    content: String,
}

pub struct OllamaChatModel {
    client: Client,
    url: String,
    model: String,
    temperature: f32,
}

impl OllamaChatModel {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: Client::new(),
            url: format!("{}/api/chat", config.ollama_base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl ChatModel for OllamaChatModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&OllamaChatRequest {
                model: &self.model,
                messages: [OllamaMessage {
                    role: "user",
                    content: prompt,
                }],
                stream: false,
                options: OllamaOptions {
                    temperature: self.temperature,
                },
            })
            .send()
            .await
            .map_err(|e| LlmError::Provider(format!("Ollama request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(LlmError::Provider(format!("Ollama chat failed: {status} {body}")));
        }

        let data: OllamaChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Provider(format!("Ollama response parse error: {e}")))?;

        data.message
            .map(|m| m.content)
            .ok_or(LlmError::EmptyResponse)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
