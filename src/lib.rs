//! Umbrella crate for reviewscope.
//!
//! This crate stitches the pipeline stages together so callers can go from
//! unlabeled review records to an aggregate metrics report plus a generated
//! overview with a single API entry point. The stages themselves live in
//! focused member crates and are re-exported here.
//!
//! The two analysis components share no mutable state and have no ordering
//! dependency on each other; only the labeling step must run first, because
//! aggregation requires every review to carry a sentiment label.

pub use metrics::{aggregate, Bucket, MetricsError, MetricsReport};
pub use overview::{
    render_markdown, summarize, AnthropicChat, AppContext, ChatConfig, ChatError, ChatModel,
    OverviewError, ParseError, SummarizerConfig,
};
pub use reviews::{Review, ReviewError, ReviewSource, Sentiment};
pub use scrapers::{AppStoreClient, GooglePlayClient, ScrapeError};
pub use sentiment::{
    label_reviews, HfSentimentClient, SentimentConfig, SentimentError, SentimentLabeler,
};

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while running reviews through the analysis pipeline.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("sentiment labeling failed: {0}")]
    Sentiment(#[from] SentimentError),

    #[error("metrics aggregation failed: {0}")]
    Metrics(#[from] MetricsError),

    #[error("overview generation failed: {0}")]
    Overview(#[from] OverviewError),
}

impl PipelineError {
    /// True when the failure means "there was nothing to analyze", as opposed
    /// to a collaborator misbehaving.
    pub fn is_no_data(&self) -> bool {
        matches!(self, PipelineError::Metrics(MetricsError::NoData))
    }
}

/// Combined output of both analysis components.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewAnalysis {
    /// Labeled input records, in their original order.
    pub reviews: Vec<Review>,
    pub metrics: MetricsReport,
    /// Markdown overview generated by the batched summarizer.
    pub overview: String,
}

/// Run the full pipeline: label sentiment, aggregate metrics, generate the
/// overview.
///
/// The metrics aggregation and the overview fold are independent of each
/// other; both consume the labeled records. Empty input fails with the
/// aggregator's no-data error before any model call is made.
pub async fn analyze_reviews(
    unlabeled: Vec<Review>,
    ctx: &AppContext,
    labeler: &dyn SentimentLabeler,
    model: &dyn ChatModel,
    summarizer_cfg: &SummarizerConfig,
) -> Result<ReviewAnalysis, PipelineError> {
    if unlabeled.is_empty() {
        return Err(MetricsError::NoData.into());
    }

    let reviews = label_reviews(unlabeled, labeler).await?;
    tracing::debug!(reviews = reviews.len(), "sentiment labeling complete");

    let metrics = aggregate(&reviews)?;
    let overview = summarize(&reviews, ctx, model, summarizer_cfg).await?;

    Ok(ReviewAnalysis {
        reviews,
        metrics,
        overview,
    })
}
