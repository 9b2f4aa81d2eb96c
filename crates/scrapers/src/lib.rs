//! Marketplace adapters that fetch user reviews and normalize them into the
//! shared [`reviews::Review`] shape.
//!
//! Two adapters exist, one per marketplace. Both populate every `Review`
//! field except `sentiment`, which the labeling stage fills in later; that
//! normalization boundary is what lets the rest of the pipeline ignore where
//! a review came from.
//!
//! Network failures surface as [`ScrapeError`]. An empty result set is not an
//! error at this layer; the caller decides whether "no reviews" is a 404.

mod app_store;
mod google_play;

pub use app_store::AppStoreClient;
pub use google_play::GooglePlayClient;

use thiserror::Error;

/// Errors from marketplace adapters.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScrapeError {
    /// The HTTP request failed or returned a non-success status.
    #[error("scrape request failed: {0}")]
    Request(String),

    /// The marketplace answered with a payload we could not interpret.
    /// These endpoints are undocumented, so shape drift is expected to show
    /// up here rather than as a panic.
    #[error("unexpected marketplace payload: {0}")]
    UnexpectedPayload(String),
}

fn build_client(timeout_secs: u64) -> Result<reqwest::Client, ScrapeError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(concat!("reviewscope/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ScrapeError::Request(format!("failed to build HTTP client: {e}")))
}
