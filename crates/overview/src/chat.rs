//! Chat-model collaborator behind the summarizer.
//!
//! The fold only depends on the [`ChatModel`] trait; [`AnthropicChat`] is the
//! production implementation against the Anthropic messages API. The client
//! is built once by the hosting process and injected per call, with no hidden
//! global singleton.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Default Anthropic API base URL.
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Errors from a chat-model collaborator.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ChatError {
    /// Missing or invalid configuration (API key, model name, temperature).
    #[error("chat configuration error: {0}")]
    Config(String),

    /// The HTTP call failed or the provider returned a non-success status.
    #[error("chat request failed: {0}")]
    Request(String),

    /// The provider answered, but the body had no usable text content.
    #[error("invalid chat response: {0}")]
    InvalidResponse(String),
}

/// A blocking (per-call) text-generation collaborator.
///
/// One call per review batch. Retry policy, if any, belongs to the
/// implementation; the summarizer fold never retries.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ChatError>;
}

/// Configuration for [`AnthropicChat`].
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub model: String,
    pub api_key: String,
    /// Override for self-hosted gateways; defaults to the public endpoint.
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl ChatConfig {
    /// Build from environment: `ANTHROPIC_MODEL`, `ANTHROPIC_API_KEY`,
    /// `ANTHROPIC_TEMPERATURE` (optional, default 0.3).
    pub fn from_env() -> Result<Self, ChatError> {
        let model = std::env::var("ANTHROPIC_MODEL")
            .map_err(|_| ChatError::Config("ANTHROPIC_MODEL is not set".into()))?;
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| ChatError::Config("ANTHROPIC_API_KEY is not set".into()))?;
        let temperature = match std::env::var("ANTHROPIC_TEMPERATURE") {
            Ok(raw) => raw
                .parse::<f32>()
                .map_err(|_| ChatError::Config(format!("invalid ANTHROPIC_TEMPERATURE: {raw:?}")))?,
            Err(_) => 0.3,
        };
        Ok(Self {
            model,
            api_key,
            base_url: ANTHROPIC_API_URL.to_string(),
            temperature,
            max_tokens: 2048,
            timeout_secs: 120,
        })
    }
}

/// Anthropic messages API client.
pub struct AnthropicChat {
    config: ChatConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl AnthropicChat {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ChatModel for AnthropicChat {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ChatError> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": system,
            "messages": [{ "role": "user", "content": user }],
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Request(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Request(format!("HTTP error {status}: {body}")));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ChatError::InvalidResponse(format!("invalid JSON response: {e}")))?;

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or_else(|| ChatError::InvalidResponse("response contained no text block".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_block_is_extracted_from_response() {
        let raw = serde_json::json!({
            "id": "msg_01",
            "content": [
                { "type": "thinking", "thinking": "..." },
                { "type": "text", "text": "<key_findings>ok</key_findings>" }
            ],
            "model": "claude-test",
            "stop_reason": "end_turn"
        });
        let parsed: MessagesResponse = serde_json::from_value(raw).unwrap();
        let text = parsed
            .content
            .into_iter()
            .find(|b| b.kind == "text")
            .map(|b| b.text)
            .unwrap();
        assert_eq!(text, "<key_findings>ok</key_findings>");
    }

    #[test]
    fn response_without_text_block_fails_parsing() {
        let raw = serde_json::json!({ "content": [{ "type": "tool_use" }] });
        let parsed: MessagesResponse = serde_json::from_value(raw).unwrap();
        assert!(parsed.content.iter().all(|b| b.kind != "text"));
    }
}
