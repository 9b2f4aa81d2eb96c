use thiserror::Error;

/// Validation errors raised while constructing or deserializing a review.
///
/// All variants are typed, cloneable, and comparable so callers can map them
/// to precise HTTP responses and tests can match on them exactly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReviewError {
    /// Rating fell outside the closed range `1..=5`.
    #[error("rating {0} is outside the valid range 1..=5")]
    RatingOutOfRange(u8),

    /// A sentiment string did not match any of the five fixed labels.
    #[error("unknown sentiment label: {0:?}")]
    UnknownSentimentLabel(String),

    /// A source string did not match any known marketplace.
    #[error("unknown review source: {0:?}")]
    UnknownSource(String),
}

impl ReviewError {
    /// Suggested HTTP status code; all review validation errors are client
    /// errors.
    pub fn http_status_code(&self) -> u16 {
        400
    }
}
