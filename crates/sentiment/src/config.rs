use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the hosted sentiment inference client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// Full URL of the text-classification endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Optional bearer token for the inference provider.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SentimentConfig {
    /// Build from environment: `SENTIMENT_API_URL`, `SENTIMENT_API_TOKEN`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("SENTIMENT_API_URL") {
            if !url.is_empty() {
                config.api_url = url;
            }
        }
        if let Ok(token) = std::env::var("SENTIMENT_API_TOKEN") {
            if !token.is_empty() {
                config.api_token = Some(token);
            }
        }
        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_api_url() -> String {
    // Hosted inference endpoint for the multilingual sentiment model whose
    // label set matches the five-value Sentiment enum.
    "https://api-inference.huggingface.co/models/tabularisai/multilingual-sentiment-analysis"
        .to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
