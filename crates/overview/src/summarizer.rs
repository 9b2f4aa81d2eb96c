//! The sequential batch fold producing the final overview.

use reviews::Review;
use serde::{Deserialize, Serialize};

use crate::chat::ChatModel;
use crate::markdown::render_markdown;
use crate::prompt::{system_prompt, user_prompt};
use crate::OverviewError;

/// Fixed context sent with every chat call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppContext {
    /// Display name of the app.
    pub name: String,
    /// Marketplace description; empty is valid when none could be fetched.
    pub description: String,
}

/// Summarizer tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Reviews per chat call. Must be at least 1.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

impl SummarizerConfig {
    /// Build from environment: `LLM_BATCH_SIZE`, default 50. An unparseable
    /// value falls back to the default rather than failing startup.
    pub fn from_env() -> Self {
        let batch_size = std::env::var("LLM_BATCH_SIZE")
            .ok()
            .and_then(|raw| raw.parse::<usize>().ok())
            .unwrap_or_else(default_batch_size);
        Self { batch_size }
    }
}

fn default_batch_size() -> usize {
    50
}

/// Fold all reviews into one Markdown overview.
///
/// Partitions `reviews` into contiguous batches of `cfg.batch_size`
/// (preserving input order, last batch possibly shorter) and issues one chat
/// call per batch, strictly in order. Each call receives the fixed app
/// context, the batch, and the running summary; its output is converted to
/// Markdown via [`render_markdown`] and *replaces* the running summary.
/// Earlier batches influence later ones only through that carried summary.
///
/// The transformed Markdown form is what is carried between batches and what
/// is returned after the final one. Any chat failure aborts the whole fold;
/// there is no partial-summary fallback. Zero reviews produce an empty
/// summary without calling the model.
pub async fn summarize(
    reviews: &[Review],
    ctx: &AppContext,
    model: &dyn ChatModel,
    cfg: &SummarizerConfig,
) -> Result<String, OverviewError> {
    if cfg.batch_size == 0 {
        return Err(OverviewError::InvalidBatchSize);
    }

    let system = system_prompt(ctx);
    let batches: Vec<&[Review]> = reviews.chunks(cfg.batch_size).collect();
    tracing::debug!(
        reviews = reviews.len(),
        batches = batches.len(),
        batch_size = cfg.batch_size,
        "starting overview fold"
    );

    let mut summary = String::new();
    for (index, batch) in batches.iter().enumerate() {
        let user = user_prompt(batch, &summary);
        let raw = model.complete(&system, &user).await?;
        summary = render_markdown(&raw)?;
        tracing::debug!(batch = index + 1, summary_len = summary.len(), "batch folded");
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatError, ChatModel};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use reviews::ReviewSource;
    use std::sync::Mutex;

    fn reviews(count: usize) -> Vec<Review> {
        (0..count)
            .map(|i| {
                Review::new(
                    Some(format!("r{i}")),
                    ReviewSource::GooglePlayMarket,
                    "tester",
                    "us",
                    (i % 5 + 1) as u8,
                    format!("review number {i}"),
                    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                )
                .unwrap()
            })
            .collect()
    }

    fn ctx() -> AppContext {
        AppContext {
            name: "Star Walker".into(),
            description: "Stargazing companion.".into(),
        }
    }

    /// Records each call's carried summary and answers with a tagged body
    /// that names the call number.
    struct RecordingModel {
        summaries_seen: Mutex<Vec<String>>,
        fail_on_call: Option<usize>,
    }

    impl RecordingModel {
        fn new() -> Self {
            Self {
                summaries_seen: Mutex::new(Vec::new()),
                fail_on_call: None,
            }
        }

        fn failing_on(call: usize) -> Self {
            Self {
                summaries_seen: Mutex::new(Vec::new()),
                fail_on_call: Some(call),
            }
        }

        fn extract_summary(user_prompt: &str) -> String {
            // The user template places the carried summary between the first
            // header line and the "Next batch" marker.
            let start = user_prompt.find(":\n").map(|i| i + 2).unwrap_or(0);
            let end = user_prompt
                .find("\nNext batch of reviews:")
                .unwrap_or(user_prompt.len());
            user_prompt[start..end].trim().to_string()
        }
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        async fn complete(&self, _system: &str, user: &str) -> Result<String, ChatError> {
            let mut seen = self.summaries_seen.lock().unwrap();
            seen.push(Self::extract_summary(user));
            let call = seen.len();
            if self.fail_on_call == Some(call) {
                return Err(ChatError::Request("quota exceeded".into()));
            }
            Ok(format!("<key_findings>summary after call {call}</key_findings>"))
        }
    }

    #[tokio::test]
    async fn one_hundred_twenty_reviews_fold_in_three_calls() {
        let model = RecordingModel::new();
        let cfg = SummarizerConfig { batch_size: 50 };

        let result = summarize(&reviews(120), &ctx(), &model, &cfg).await.unwrap();

        let seen = model.summaries_seen.lock().unwrap();
        assert_eq!(seen.len(), 3, "120 reviews at batch size 50 is 3 calls");
        assert_eq!(seen[0], "", "first call carries an empty summary");
        assert_eq!(seen[1], "**Key Findings**:\nsummary after call 1");
        assert_eq!(seen[2], "**Key Findings**:\nsummary after call 2");
        assert_eq!(result, "**Key Findings**:\nsummary after call 3");
    }

    #[tokio::test]
    async fn failure_mid_fold_aborts_without_partial_output() {
        let model = RecordingModel::failing_on(2);
        let cfg = SummarizerConfig { batch_size: 50 };

        let result = summarize(&reviews(120), &ctx(), &model, &cfg).await;
        assert!(matches!(result, Err(OverviewError::Generation(_))));

        // The third batch was never attempted.
        assert_eq!(model.summaries_seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_model_output_surfaces_as_parse_error() {
        struct BrokenModel;

        #[async_trait]
        impl ChatModel for BrokenModel {
            async fn complete(&self, _: &str, _: &str) -> Result<String, ChatError> {
                Ok("<key_findings>never closed".into())
            }
        }

        let cfg = SummarizerConfig { batch_size: 50 };
        let result = summarize(&reviews(5), &ctx(), &BrokenModel, &cfg).await;
        assert!(matches!(result, Err(OverviewError::Parse(_))));
    }

    #[tokio::test]
    async fn zero_reviews_produce_empty_summary_without_model_calls() {
        let model = RecordingModel::new();
        let cfg = SummarizerConfig::default();

        let result = summarize(&[], &ctx(), &model, &cfg).await.unwrap();
        assert!(result.is_empty());
        assert!(model.summaries_seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_batch_size_is_rejected() {
        let model = RecordingModel::new();
        let cfg = SummarizerConfig { batch_size: 0 };

        let result = summarize(&reviews(10), &ctx(), &model, &cfg).await;
        assert!(matches!(result, Err(OverviewError::InvalidBatchSize)));
    }

    #[test]
    fn default_batch_size_is_fifty() {
        assert_eq!(SummarizerConfig::default().batch_size, 50);
    }
}
