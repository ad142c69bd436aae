//! Chat-completion client
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint; the default
//! deployment targets Groq.

use anyhow::{Context, Result};
use async_trait::async_trait;
use imdg_utils::LlmConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    fn model_name(&self) -> &str;

    /// Content of the first completion choice.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

pub struct GroqChatClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl GroqChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        anyhow::ensure!(!config.api_key.trim().is_empty(), "missing LLM API key");

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.api_url.trim_end_matches('/')),
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl ChatModel for GroqChatClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to call LLM API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM API error ({}): {}", status, error_text);
        }

        let result: ChatResponse = response
            .json()
            .await
            .context("Failed to parse LLM response")?;

        first_choice(result)
    }
}

fn first_choice(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("No response content")
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use imdg_utils::AppConfig;

    #[test]
    fn test_request_serialization() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let request = ChatRequest {
            model: "llama-3.1-70b-versatile",
            messages: &messages,
            temperature: 0.7,
            max_tokens: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_first_choice_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"<p>ok</p>"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice(response).unwrap(), "<p>ok</p>");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(first_choice(empty).is_err());
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = AppConfig::default().llm;
        assert!(GroqChatClient::new(&config).is_err());

        let mut config = config;
        config.api_key = "gsk_test".to_string();
        let client = GroqChatClient::new(&config).unwrap();
        assert_eq!(client.endpoint, "https://api.groq.com/openai/v1/chat/completions");
        assert_eq!(client.model_name(), "llama-3.1-70b-versatile");
    }
}
