//! Descriptive metrics over a set of labeled reviews.
//!
//! [`aggregate`] is a pure function: it consumes a non-empty slice of
//! [`Review`] records and recomputes a fixed-shape [`MetricsReport`] from
//! scratch on every call. There is no incremental update path and no shared
//! state, so concurrent requests need no coordination.
//!
//! The sentiment and rating distributions are pre-seeded with every possible
//! bucket so the report shape is stable regardless of which values actually
//! occur; the country distribution only contains codes observed in the input.

use reviews::{Review, Sentiment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors produced while aggregating review metrics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MetricsError {
    /// The input slice was empty. Surfaced distinctly so callers can report
    /// "no data" instead of a degenerate report with an undefined average.
    #[error("no review data to aggregate")]
    NoData,

    /// A review reached the aggregator without a sentiment label. Labeling
    /// must run before aggregation; this is a caller bug, not bad user input.
    #[error("review at position {0} has no sentiment label")]
    UnlabeledReview(usize),
}

/// Count plus share of the total, one per distribution bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bucket {
    pub count: usize,
    /// Share of `total_reviews`, as a percentage rounded to 2 decimals.
    pub percentage: f64,
}

/// Aggregate report over one set of reviews.
///
/// Invariants, for every distribution:
/// - bucket counts sum to `total_reviews`
/// - bucket percentages sum to 100 within rounding tolerance
///   (each percentage is `round(100 * count / total, 2)`, half away from zero)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsReport {
    pub total_reviews: usize,
    /// Mean rating rounded to 2 decimals.
    pub average_rating: f64,
    /// All five sentiment buckets, present even at zero count.
    pub sentiment_distribution: BTreeMap<Sentiment, Bucket>,
    /// All five rating buckets 1..=5, present even at zero count.
    pub rating_distribution: BTreeMap<u8, Bucket>,
    /// Only countries observed in the input.
    pub country_distribution: BTreeMap<String, Bucket>,
}

/// Round half away from zero to 2 decimal places. Used consistently for the
/// average and every percentage so the sum-to-100 property holds within
/// per-bucket tolerance.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the full metrics report for a non-empty set of reviews.
///
/// Fails with [`MetricsError::NoData`] on empty input and
/// [`MetricsError::UnlabeledReview`] if any review is missing its sentiment
/// label.
pub fn aggregate(reviews: &[Review]) -> Result<MetricsReport, MetricsError> {
    if reviews.is_empty() {
        return Err(MetricsError::NoData);
    }
    let total = reviews.len();

    // Pre-seed the closed-universe distributions with zero buckets.
    let mut sentiment_counts: BTreeMap<Sentiment, usize> =
        Sentiment::ALL.iter().map(|s| (*s, 0)).collect();
    let mut rating_counts: BTreeMap<u8, usize> = (1..=5).map(|r| (r, 0)).collect();
    let mut country_counts: BTreeMap<String, usize> = BTreeMap::new();

    let mut rating_sum: u64 = 0;
    for (position, review) in reviews.iter().enumerate() {
        let sentiment = review
            .sentiment
            .ok_or(MetricsError::UnlabeledReview(position))?;
        *sentiment_counts.entry(sentiment).or_insert(0) += 1;
        // Rating is validated to 1..=5 at construction, so the bucket exists.
        *rating_counts.entry(review.rating).or_insert(0) += 1;
        *country_counts.entry(review.country.clone()).or_insert(0) += 1;
        rating_sum += u64::from(review.rating);
    }

    Ok(MetricsReport {
        total_reviews: total,
        average_rating: round2(rating_sum as f64 / total as f64),
        sentiment_distribution: into_buckets(sentiment_counts, total),
        rating_distribution: into_buckets(rating_counts, total),
        country_distribution: into_buckets(country_counts, total),
    })
}

/// Convert raw counts into buckets carrying each count's share of `total`.
fn into_buckets<K: Ord>(counts: BTreeMap<K, usize>, total: usize) -> BTreeMap<K, Bucket> {
    counts
        .into_iter()
        .map(|(key, count)| {
            (
                key,
                Bucket {
                    count,
                    percentage: round2(count as f64 / total as f64 * 100.0),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use reviews::ReviewSource;

    fn review(rating: u8, sentiment: Sentiment, country: &str) -> Review {
        Review::new(
            None,
            ReviewSource::AppStore,
            "tester",
            country,
            rating,
            "text",
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
        .with_sentiment(sentiment)
    }

    #[test]
    fn empty_input_is_no_data() {
        assert_eq!(aggregate(&[]), Err(MetricsError::NoData));
    }

    #[test]
    fn unlabeled_review_is_rejected_with_position() {
        let mut reviews = vec![
            review(5, Sentiment::Positive, "us"),
            review(3, Sentiment::Neutral, "us"),
        ];
        reviews[1].sentiment = None;
        assert_eq!(aggregate(&reviews), Err(MetricsError::UnlabeledReview(1)));
    }

    #[test]
    fn average_rating_matches_arithmetic_mean() {
        let reviews: Vec<Review> = [5u8, 5, 4, 3, 5]
            .iter()
            .map(|r| review(*r, Sentiment::Positive, "us"))
            .collect();
        let report = aggregate(&reviews).unwrap();
        assert_eq!(report.average_rating, 4.4);
        assert_eq!(report.total_reviews, 5);
    }

    #[test]
    fn all_buckets_present_even_at_zero_count() {
        let reviews = vec![
            review(5, Sentiment::VeryPositive, "us"),
            review(5, Sentiment::VeryPositive, "us"),
        ];
        let report = aggregate(&reviews).unwrap();

        assert_eq!(report.sentiment_distribution.len(), 5);
        assert_eq!(report.rating_distribution.len(), 5);
        for rating in 1..=4u8 {
            let bucket = &report.rating_distribution[&rating];
            assert_eq!(bucket.count, 0);
            assert_eq!(bucket.percentage, 0.0);
        }
        let fives = &report.rating_distribution[&5];
        assert_eq!(fives.count, 2);
        assert_eq!(fives.percentage, 100.0);
    }

    #[test]
    fn country_distribution_only_contains_observed_codes() {
        let reviews = vec![
            review(4, Sentiment::Positive, "us"),
            review(2, Sentiment::Negative, "de"),
            review(3, Sentiment::Neutral, "us"),
        ];
        let report = aggregate(&reviews).unwrap();
        assert_eq!(report.country_distribution.len(), 2);
        assert_eq!(report.country_distribution["us"].count, 2);
        assert_eq!(report.country_distribution["de"].count, 1);
        assert!(!report.country_distribution.contains_key("fr"));
    }

    #[test]
    fn counts_sum_to_total_and_percentages_sum_to_100() {
        let sentiments = [
            Sentiment::VeryNegative,
            Sentiment::Negative,
            Sentiment::Neutral,
            Sentiment::Positive,
            Sentiment::VeryPositive,
        ];
        let countries = ["us", "de", "jp", "br"];
        let reviews: Vec<Review> = (0..37)
            .map(|i| {
                review(
                    (i % 5 + 1) as u8,
                    sentiments[i % sentiments.len()],
                    countries[i % countries.len()],
                )
            })
            .collect();
        let report = aggregate(&reviews).unwrap();

        let check = |counts: Vec<usize>, percentages: Vec<f64>| {
            assert_eq!(counts.iter().sum::<usize>(), report.total_reviews);
            let sum: f64 = percentages.iter().sum();
            let tolerance = 0.01 * percentages.len() as f64;
            assert!(
                (sum - 100.0).abs() <= tolerance,
                "percentages summed to {sum}"
            );
        };

        check(
            report.sentiment_distribution.values().map(|b| b.count).collect(),
            report
                .sentiment_distribution
                .values()
                .map(|b| b.percentage)
                .collect(),
        );
        check(
            report.rating_distribution.values().map(|b| b.count).collect(),
            report
                .rating_distribution
                .values()
                .map(|b| b.percentage)
                .collect(),
        );
        check(
            report.country_distribution.values().map(|b| b.count).collect(),
            report
                .country_distribution
                .values()
                .map(|b| b.percentage)
                .collect(),
        );
    }

    #[test]
    fn buckets_carry_shares_across_all_three_key_types() {
        let reviews = vec![
            review(5, Sentiment::VeryPositive, "us"),
            review(5, Sentiment::VeryPositive, "us"),
            review(1, Sentiment::VeryNegative, "de"),
            review(3, Sentiment::Neutral, "us"),
        ];
        let report = aggregate(&reviews).unwrap();

        assert_eq!(
            report.sentiment_distribution[&Sentiment::VeryPositive],
            Bucket {
                count: 2,
                percentage: 50.0
            }
        );
        assert_eq!(
            report.rating_distribution[&1],
            Bucket {
                count: 1,
                percentage: 25.0
            }
        );
        assert_eq!(
            report.country_distribution["us"],
            Bucket {
                count: 3,
                percentage: 75.0
            }
        );
    }

    #[test]
    fn report_serializes_with_wire_label_keys() {
        let reviews = vec![review(5, Sentiment::VeryPositive, "us")];
        let report = aggregate(&reviews).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert!(json["sentiment_distribution"].get("Very Positive").is_some());
        assert!(json["sentiment_distribution"].get("Very Negative").is_some());
        assert!(json["rating_distribution"].get("5").is_some());
        assert_eq!(json["total_reviews"], 1);
    }
}
