//! OpenAI-compatible chat completions client.

use super::{build_messages, http_client, ChatService, WireMessage};
use crate::config::ModelConfig;
use crate::errors::ServiceError;
use crate::models::ConversationTurn;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for `POST {api_url}/chat/completions`.
pub struct OpenAiClient {
    http_client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout_seconds: u64,
}

impl OpenAiClient {
    /// Build a client. Fails when no API key is configured.
    pub fn new(config: &ModelConfig) -> Result<Self, ServiceError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ServiceError::MissingApiKey)?;

        Ok(Self {
            http_client: http_client(config.timeout_seconds)?,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.name.clone(),
            temperature: config.temperature,
            timeout_seconds: config.timeout_seconds,
        })
    }
}

#[async_trait]
impl ChatService for OpenAiClient {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ConversationTurn],
        user_message: &str,
    ) -> Result<String, ServiceError> {
        let url = format!("{}/chat/completions", self.api_url);

        let request = CompletionRequest {
            model: &self.model,
            messages: build_messages(system_prompt, history, user_message),
            temperature: self.temperature,
        };

        debug!(
            "Sending chat completion with {} messages to {}",
            request.messages.len(),
            url
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::from_reqwest(e, &self.api_url, self.timeout_seconds))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::from_status(status.as_u16(), body));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ServiceError::EmptyReply)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
