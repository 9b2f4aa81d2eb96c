//! Core review data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ReviewError;

/// Marketplace a review was fetched from.
///
/// The set is closed: each variant corresponds to one source adapter, and the
/// wire names match the query parameter accepted by the HTTP API.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSource {
    /// Apple App Store.
    #[default]
    AppStore,
    /// Google Play.
    GooglePlayMarket,
}

impl ReviewSource {
    /// Wire name used in requests and serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewSource::AppStore => "app_store",
            ReviewSource::GooglePlayMarket => "google_play_market",
        }
    }
}

impl fmt::Display for ReviewSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewSource {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app_store" => Ok(ReviewSource::AppStore),
            "google_play_market" => Ok(ReviewSource::GooglePlayMarket),
            other => Err(ReviewError::UnknownSource(other.to_string())),
        }
    }
}

/// One of the five ordered sentiment labels a classifier can assign.
///
/// The variants are declared from most negative to most positive, so the
/// derived `Ord` matches the semantic ordering. Wire names are the
/// human-readable forms emitted by the sentiment model (`"Very Negative"`,
/// `"Negative"`, `"Neutral"`, `"Positive"`, `"Very Positive"`); no other
/// string parses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sentiment {
    #[serde(rename = "Very Negative")]
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    #[serde(rename = "Very Positive")]
    VeryPositive,
}

impl Sentiment {
    /// All five labels in semantic order. Useful for pre-seeding
    /// distributions so every bucket is present even at zero count.
    pub const ALL: [Sentiment; 5] = [
        Sentiment::VeryNegative,
        Sentiment::Negative,
        Sentiment::Neutral,
        Sentiment::Positive,
        Sentiment::VeryPositive,
    ];

    /// Human-readable label as emitted by the classifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::VeryNegative => "Very Negative",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
            Sentiment::VeryPositive => "Very Positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Very Negative" => Ok(Sentiment::VeryNegative),
            "Negative" => Ok(Sentiment::Negative),
            "Neutral" => Ok(Sentiment::Neutral),
            "Positive" => Ok(Sentiment::Positive),
            "Very Positive" => Ok(Sentiment::VeryPositive),
            other => Err(ReviewError::UnknownSentimentLabel(other.to_string())),
        }
    }
}

/// A normalized user review, immutable once constructed.
///
/// Every field except `sentiment` is populated by the source adapter;
/// `sentiment` stays `None` until the labeling stage assigns one of the five
/// fixed labels.
///
/// Invariant: `rating` is always in `1..=5`. [`Review::new`] and serde
/// deserialization both enforce it, so downstream stages can index rating
/// buckets without re-checking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    /// Marketplace review identifier. `None` for sources that do not issue
    /// one (the App Store feed does not).
    #[serde(default)]
    pub review_id: Option<String>,

    /// Which marketplace adapter produced this record.
    pub source: ReviewSource,

    /// Display name of the reviewer.
    pub user_name: String,

    /// Country code supplied by the caller. Not validated against the
    /// record's actual locale.
    pub country: String,

    /// Star rating in `1..=5`.
    #[serde(deserialize_with = "rating_in_range")]
    pub rating: u8,

    /// Sentiment label, absent until the labeling stage runs.
    #[serde(default)]
    pub sentiment: Option<Sentiment>,

    /// Free-form review body; may be empty.
    pub review_text: String,

    /// When the review was posted.
    pub date: DateTime<Utc>,
}

impl Review {
    /// Build a review, validating the rating range.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        review_id: Option<String>,
        source: ReviewSource,
        user_name: impl Into<String>,
        country: impl Into<String>,
        rating: u8,
        review_text: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Result<Self, ReviewError> {
        if !(1..=5).contains(&rating) {
            return Err(ReviewError::RatingOutOfRange(rating));
        }
        Ok(Self {
            review_id,
            source,
            user_name: user_name.into(),
            country: country.into(),
            rating,
            sentiment: None,
            review_text: review_text.into(),
            date,
        })
    }

    /// Returns a copy with the given sentiment assigned.
    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = Some(sentiment);
        self
    }
}

fn rating_in_range<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let rating = u8::deserialize(deserializer)?;
    if (1..=5).contains(&rating) {
        Ok(rating)
    } else {
        Err(serde::de::Error::custom(format!(
            "rating {rating} is outside the valid range 1..=5"
        )))
    }
}
