//! Hosted-inference implementation of [`SentimentLabeler`].

use async_trait::async_trait;
use reviews::Sentiment;
use serde_json::{json, Value};

use crate::{SentimentConfig, SentimentError, SentimentLabeler};

/// Client for a hosted text-classification endpoint.
///
/// One pooled `reqwest::Client` is built at construction; the hosting process
/// constructs this once at startup and injects it per request.
pub struct HfSentimentClient {
    config: SentimentConfig,
    client: reqwest::Client,
}

impl HfSentimentClient {
    pub fn new(config: SentimentConfig) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SentimentError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    async fn request_classifications(&self, texts: &[String]) -> Result<Value, SentimentError> {
        let mut request = self.client.post(&self.config.api_url).json(&json!({
            "inputs": texts,
            "options": { "wait_for_model": true },
        }));
        if let Some(token) = self.config.api_token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SentimentError::Request(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SentimentError::Request(format!("HTTP error {status}: {body}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SentimentError::InvalidResponse(format!("invalid JSON response: {e}")))
    }
}

#[async_trait]
impl SentimentLabeler for HfSentimentClient {
    async fn label(&self, texts: &[String]) -> Result<Vec<Sentiment>, SentimentError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(texts = texts.len(), "requesting sentiment classifications");
        let response = self.request_classifications(texts).await?;
        parse_labels(response)
    }
}

/// Extract one top-scoring label per input from the endpoint response.
///
/// The expected shape is one array of `{label, score}` candidates per input
/// text. Candidates are assumed sorted by score, matching the provider's
/// documented behavior; the first entry wins.
fn parse_labels(response: Value) -> Result<Vec<Sentiment>, SentimentError> {
    let per_input = match response {
        Value::Array(items) => items,
        other => {
            return Err(SentimentError::InvalidResponse(format!(
                "expected an array of classifications, got {other:?}"
            )))
        }
    };

    per_input
        .into_iter()
        .map(|candidates| {
            let top = match &candidates {
                Value::Array(list) => list.first(),
                _ => None,
            }
            .ok_or_else(|| {
                SentimentError::InvalidResponse(
                    "classification entry is not a non-empty array".into(),
                )
            })?;

            let label = top
                .get("label")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    SentimentError::InvalidResponse("missing `label` in classification".into())
                })?;

            label
                .parse::<Sentiment>()
                .map_err(|e| SentimentError::InvalidResponse(e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_top_label_per_input() {
        let response = json!([
            [
                { "label": "Very Positive", "score": 0.91 },
                { "label": "Positive", "score": 0.07 }
            ],
            [
                { "label": "Negative", "score": 0.66 },
                { "label": "Very Negative", "score": 0.30 }
            ]
        ]);
        let labels = parse_labels(response).unwrap();
        assert_eq!(labels, vec![Sentiment::VeryPositive, Sentiment::Negative]);
    }

    #[test]
    fn rejects_labels_outside_the_fixed_set() {
        let response = json!([[{ "label": "LABEL_3", "score": 0.9 }]]);
        let result = parse_labels(response);
        assert!(matches!(result, Err(SentimentError::InvalidResponse(_))));
    }

    #[test]
    fn rejects_non_array_response() {
        let response = json!({ "error": "model is loading" });
        assert!(matches!(
            parse_labels(response),
            Err(SentimentError::InvalidResponse(_))
        ));
    }

    #[test]
    fn rejects_empty_candidate_list() {
        let response = json!([[]]);
        assert!(matches!(
            parse_labels(response),
            Err(SentimentError::InvalidResponse(_))
        ));
    }
}
