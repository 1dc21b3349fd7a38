//! OpenAI chat completions provider.
//!
//! Calls `{base}/chat/completions` with the prompt as a single user message.
//! Failed attempts are retried with exponential backoff up to
//! `max_retries` attempts in total.

use async_trait::async_trait;
use log::warn;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, sleep};

use super::{ChatModel, LlmError};
use crate::config::LlmConfig;

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [Message<'a>; 1],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiChatModel {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl OpenAiChatModel {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.openai_api_key.clone().ok_or_else(|| {
            LlmError::Config("OPENAI_API_KEY is required for openai provider".to_string())
        })?;
        Ok(Self {
            client: Client::new(),
            url: format!("{}/chat/completions", config.openai_base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries.max(1),
        })
    }

    async fn attempt(&self, prompt: &str) -> Result<String, LlmError> {
        let resp = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&CompletionRequest {
                model: &self.model,
                temperature: self.temperature,
                messages: [Message {
                    role: "user",
                    content: prompt,
                }],
            })
            .send()
            .await
            .map_err(|e| LlmError::Provider(format!("OpenAI request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(LlmError::Provider(format!(
                "OpenAI completion failed: {status} {body}"
            )));
        }

        let data: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Provider(format!("OpenAI response parse error: {e}")))?;
        first_content(data)
    }
}

fn first_content(response: CompletionResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(LlmError::EmptyResponse)
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let mut last_error = LlmError::EmptyResponse;
        for attempt in 0..self.max_retries {
            match self.attempt(prompt).await {
                Ok(answer) => return Ok(answer),
                Err(e) => {
                    warn!("completion attempt {} of {} failed: {e}", attempt + 1, self.max_retries);
                    last_error = e;
                }
            }
            if attempt + 1 < self.max_retries {
                sleep(Duration::from_secs(2u64.pow(attempt + 1))).await;
            }
        }
        Err(last_error)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_has_single_user_message() {
        let body = serde_json::to_value(CompletionRequest {
            model: "gpt-4o-mini",
            temperature: 0.0,
            messages: [Message {
                role: "user",
                content: "hello",
            }],
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "gpt-4o-mini",
                "temperature": 0.0,
                "messages": [{"role": "user", "content": "hello"}]
            })
        );
    }

    #[test]
    fn first_choice_content_is_the_answer() {
        let response: CompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": "Docker is a container platform."}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        }))
        .unwrap();
        assert_eq!(first_content(response).unwrap(), "Docker is a container platform.");
    }

    #[test]
    fn missing_choices_is_empty_response() {
        let response: CompletionResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        assert!(matches!(first_content(response), Err(LlmError::EmptyResponse)));

        let response: CompletionResponse =
            serde_json::from_value(serde_json::json!({"choices": [{"message": {"content": null}}]}))
                .unwrap();
        assert!(matches!(first_content(response), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn base_url_trailing_slash_is_normalised() {
        let config = LlmConfig {
            openai_api_key: Some("sk".to_string()),
            openai_base_url: "http://localhost:9000/v1/".to_string(),
            ..LlmConfig::default()
        };
        let model = OpenAiChatModel::new(&config).unwrap();
        assert_eq!(model.url, "http://localhost:9000/v1/chat/completions");
    }
}
