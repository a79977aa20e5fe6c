//! Chat-completion service clients.
//!
//! The advisor only needs one operation from a language model: given a
//! system prompt, the transcript so far and a new user message, return
//! the assistant's reply. [`ChatService`] is that seam; the concrete
//! clients speak the OpenAI-compatible and Ollama wire formats.

pub mod ollama;
pub mod openai;

use crate::config::{ModelConfig, Provider};
use crate::errors::ServiceError;
use crate::models::{ConversationTurn, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

/// Connect timeout for both clients; the request timeout is configurable.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// A remote chat-completion backend.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Ask for the next assistant reply.
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ConversationTurn],
        user_message: &str,
    ) -> Result<String, ServiceError>;

    /// Model identifier, for logs and reports.
    fn model_name(&self) -> &str;
}

/// Message as sent on the wire by both APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

impl WireMessage {
    fn new(role: Role, content: &str) -> Self {
        Self {
            role: role.as_str().to_string(),
            content: content.to_string(),
        }
    }
}

/// System prompt, then every transcript turn in order, then the new message.
pub fn build_messages(
    system_prompt: &str,
    history: &[ConversationTurn],
    user_message: &str,
) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);

    messages.push(WireMessage::new(Role::System, system_prompt));
    messages.extend(history.iter().map(|t| WireMessage::new(t.role, &t.content)));
    messages.push(WireMessage::new(Role::User, user_message));

    messages
}

/// Build the client selected in the configuration.
pub fn client_from_config(config: &ModelConfig) -> Result<Box<dyn ChatService>, ServiceError> {
    match config.provider {
        Provider::Openai => Ok(Box::new(OpenAiClient::new(config)?)),
        Provider::Ollama => Ok(Box::new(OllamaClient::new(config)?)),
    }
}

pub(crate) fn http_client(timeout_seconds: u64) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| ServiceError::Transport(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages_order() {
        let history = vec![
            ConversationTurn::user("Best area?"),
            ConversationTurn::assistant("**Soho**"),
        ];

        let messages = build_messages("You are an advisor.", &history, "Why?");

        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(messages[0].content, "You are an advisor.");
        assert_eq!(messages[2].content, "**Soho**");
        assert_eq!(messages[3].content, "Why?");
    }

    #[test]
    fn test_client_from_config_selects_provider() {
        let mut config = ModelConfig {
            api_key: Some("sk-test".to_string()),
            ..ModelConfig::default()
        };
        let client = client_from_config(&config).unwrap();
        assert_eq!(client.model_name(), "gpt-4");

        config.provider = Provider::Ollama;
        config.name = "llama3.2:latest".to_string();
        let client = client_from_config(&config).unwrap();
        assert_eq!(client.model_name(), "llama3.2:latest");
    }
}
