//! Ollama chat API client.

use super::{build_messages, http_client, ChatService, WireMessage};
use crate::config::ModelConfig;
use crate::errors::ServiceError;
use crate::models::ConversationTurn;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Client for `POST {api_url}/api/chat` with streaming disabled.
pub struct OllamaClient {
    http_client: reqwest::Client,
    ollama_url: String,
    model_name: String,
    temperature: f32,
    timeout_seconds: u64,
}

impl OllamaClient {
    pub fn new(config: &ModelConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            http_client: http_client(config.timeout_seconds)?,
            ollama_url: config.api_url.trim_end_matches('/').to_string(),
            model_name: config.name.clone(),
            temperature: config.temperature,
            timeout_seconds: config.timeout_seconds,
        })
    }
}

#[async_trait]
impl ChatService for OllamaClient {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ConversationTurn],
        user_message: &str,
    ) -> Result<String, ServiceError> {
        let url = format!("{}/api/chat", self.ollama_url);

        let request = OllamaChatRequest {
            model: &self.model_name,
            messages: build_messages(system_prompt, history, user_message),
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        debug!("Sending chat request with {} messages", request.messages.len());

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::from_reqwest(e, &self.ollama_url, self.timeout_seconds))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::from_status(status.as_u16(), body));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        let content = chat_response.message.content;
        if content.trim().is_empty() {
            return Err(ServiceError::EmptyReply);
        }
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
