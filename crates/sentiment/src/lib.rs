//! Sentiment labeling for review texts.
//!
//! The pipeline core only depends on the [`SentimentLabeler`] trait: given a
//! slice of texts it returns exactly one of the five fixed labels per text,
//! in the same order. [`HfSentimentClient`] is the production implementation
//! backed by a hosted text-classification endpoint; tests substitute local
//! trait impls.
//!
//! [`label_reviews`] is the assignment step. A labeler that returns a
//! different number of labels than it was given texts is a fatal error,
//! never a silently truncated zip.

mod api;
mod config;

pub use api::HfSentimentClient;
pub use config::SentimentConfig;

use async_trait::async_trait;
use reviews::{Review, Sentiment};
use thiserror::Error;

/// Errors produced by sentiment labeling.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SentimentError {
    /// The labeler returned a different count of labels than input texts.
    #[error("labeler returned {got} labels for {expected} texts")]
    LabelCountMismatch { expected: usize, got: usize },

    /// The HTTP request to the inference endpoint failed.
    #[error("sentiment request failed: {0}")]
    Request(String),

    /// The endpoint answered, but the body was not in the expected shape or
    /// contained a label outside the fixed five-value set.
    #[error("invalid sentiment response: {0}")]
    InvalidResponse(String),
}

/// Collaborator that assigns one sentiment label per input text.
///
/// Contract: the returned vector has the same length and order as `texts`.
/// Implementations own their network policy (timeouts, retries); the pipeline
/// performs no retries of its own.
#[async_trait]
pub trait SentimentLabeler: Send + Sync {
    async fn label(&self, texts: &[String]) -> Result<Vec<Sentiment>, SentimentError>;
}

/// Label a set of reviews in place, returning the labeled records.
///
/// Issues a single labeler call for all texts, then assigns the results back
/// in order. Empty input is valid and returns immediately without calling
/// the labeler.
pub async fn label_reviews(
    mut reviews: Vec<Review>,
    labeler: &dyn SentimentLabeler,
) -> Result<Vec<Review>, SentimentError> {
    if reviews.is_empty() {
        return Ok(reviews);
    }

    let texts: Vec<String> = reviews.iter().map(|r| r.review_text.clone()).collect();
    let labels = labeler.label(&texts).await?;

    if labels.len() != reviews.len() {
        return Err(SentimentError::LabelCountMismatch {
            expected: reviews.len(),
            got: labels.len(),
        });
    }

    for (review, label) in reviews.iter_mut().zip(labels) {
        review.sentiment = Some(label);
    }
    Ok(reviews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use reviews::ReviewSource;

    struct FixedLabeler(Vec<Sentiment>);

    #[async_trait]
    impl SentimentLabeler for FixedLabeler {
        async fn label(&self, _texts: &[String]) -> Result<Vec<Sentiment>, SentimentError> {
            Ok(self.0.clone())
        }
    }

    fn review(text: &str) -> Review {
        Review::new(
            None,
            ReviewSource::GooglePlayMarket,
            "tester",
            "us",
            4,
            text,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn labels_are_assigned_in_order() {
        let reviews = vec![review("great"), review("bad"), review("meh")];
        let labeler = FixedLabeler(vec![
            Sentiment::VeryPositive,
            Sentiment::VeryNegative,
            Sentiment::Neutral,
        ]);

        let labeled = label_reviews(reviews, &labeler).await.unwrap();
        assert_eq!(labeled[0].sentiment, Some(Sentiment::VeryPositive));
        assert_eq!(labeled[1].sentiment, Some(Sentiment::VeryNegative));
        assert_eq!(labeled[2].sentiment, Some(Sentiment::Neutral));
    }

    #[tokio::test]
    async fn count_mismatch_is_fatal() {
        let reviews: Vec<Review> = (0..10).map(|i| review(&format!("review {i}"))).collect();
        let labeler = FixedLabeler(vec![Sentiment::Neutral; 9]);

        let result = label_reviews(reviews, &labeler).await;
        assert!(matches!(
            result,
            Err(SentimentError::LabelCountMismatch {
                expected: 10,
                got: 9
            })
        ));
    }

    #[tokio::test]
    async fn empty_input_skips_the_labeler() {
        struct PanickingLabeler;

        #[async_trait]
        impl SentimentLabeler for PanickingLabeler {
            async fn label(&self, _: &[String]) -> Result<Vec<Sentiment>, SentimentError> {
                panic!("labeler must not be called for empty input");
            }
        }

        let labeled = label_reviews(Vec::new(), &PanickingLabeler).await.unwrap();
        assert!(labeled.is_empty());
    }
}
