//! Apple App Store adapter, backed by the public customer-reviews RSS feed.

use chrono::{DateTime, Utc};
use reviews::{Review, ReviewSource};
use serde_json::Value;

use crate::{build_client, ScrapeError};

/// Reviews per RSS feed page; fixed by the feed itself.
const PAGE_SIZE: usize = 50;
/// The feed stops serving pages past this index.
const MAX_PAGES: usize = 10;

/// Client for the App Store customer-reviews feed.
pub struct AppStoreClient {
    client: reqwest::Client,
    base_url: String,
}

impl AppStoreClient {
    pub fn new() -> Result<Self, ScrapeError> {
        Ok(Self {
            client: build_client(30)?,
            base_url: "https://itunes.apple.com".to_string(),
        })
    }

    /// Override the feed host, used by tests and proxies.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch up to `num_reviews` of the most recent reviews for `app_id` in
    /// the given storefront country. The App Store does not expose review
    /// ids through this feed, so `review_id` is `None` on every record.
    pub async fn fetch_reviews(
        &self,
        app_id: &str,
        country: &str,
        num_reviews: usize,
    ) -> Result<Vec<Review>, ScrapeError> {
        let mut collected = Vec::with_capacity(num_reviews.min(PAGE_SIZE * MAX_PAGES));
        let pages = num_reviews.div_ceil(PAGE_SIZE).clamp(1, MAX_PAGES);

        for page in 1..=pages {
            let url = format!(
                "{}/{}/rss/customerreviews/page={}/id={}/sortby=mostrecent/json",
                self.base_url, country, page, app_id
            );
            tracing::debug!(%url, "fetching app store review page");

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| ScrapeError::Request(format!("HTTP request failed: {e}")))?;
            if !response.status().is_success() {
                return Err(ScrapeError::Request(format!(
                    "HTTP error {} from app store feed",
                    response.status()
                )));
            }
            let body: Value = response
                .json()
                .await
                .map_err(|e| ScrapeError::UnexpectedPayload(format!("invalid JSON: {e}")))?;

            let entries = parse_feed_page(&body, country)?;
            let page_was_short = entries.len() < PAGE_SIZE;
            collected.extend(entries);

            if collected.len() >= num_reviews || page_was_short {
                break;
            }
        }

        collected.truncate(num_reviews);
        Ok(collected)
    }
}

/// Extract the reviews of one feed page. The first entry of page 1 describes
/// the app itself and carries no rating, so entries missing review fields
/// are skipped rather than treated as payload errors.
fn parse_feed_page(body: &Value, country: &str) -> Result<Vec<Review>, ScrapeError> {
    let feed = body
        .get("feed")
        .ok_or_else(|| ScrapeError::UnexpectedPayload("missing `feed` object".into()))?;

    // A feed with no reviews has no `entry` key at all.
    let entries = match feed.get("entry") {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items.as_slice(),
        // A single review serializes as a bare object.
        Some(single @ Value::Object(_)) => std::slice::from_ref(single),
        Some(other) => {
            return Err(ScrapeError::UnexpectedPayload(format!(
                "unexpected `entry` shape: {other:?}"
            )))
        }
    };

    let mut parsed = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(review) = parse_entry(entry, country)? {
            parsed.push(review);
        }
    }
    Ok(parsed)
}

fn parse_entry(entry: &Value, country: &str) -> Result<Option<Review>, ScrapeError> {
    let rating = match label(entry, "im:rating") {
        Some(raw) => raw.parse::<u8>().map_err(|_| {
            ScrapeError::UnexpectedPayload(format!("non-numeric rating: {raw:?}"))
        })?,
        // App-metadata entry, not a review.
        None => return Ok(None),
    };

    let user_name = entry
        .get("author")
        .and_then(|a| a.get("name"))
        .and_then(|n| n.get("label"))
        .and_then(Value::as_str)
        .ok_or_else(|| ScrapeError::UnexpectedPayload("missing author name".into()))?;

    let review_text = label(entry, "content").unwrap_or_default();

    let date_raw = label(entry, "updated")
        .ok_or_else(|| ScrapeError::UnexpectedPayload("missing `updated` timestamp".into()))?;
    let date: DateTime<Utc> = DateTime::parse_from_rfc3339(&date_raw)
        .map_err(|e| ScrapeError::UnexpectedPayload(format!("bad timestamp {date_raw:?}: {e}")))?
        .with_timezone(&Utc);

    let review = Review::new(
        None,
        ReviewSource::AppStore,
        user_name,
        country,
        rating,
        review_text,
        date,
    )
    .map_err(|e| ScrapeError::UnexpectedPayload(e.to_string()))?;
    Ok(Some(review))
}

/// Fetch the `label` string of a feed field like `{"im:rating": {"label": "5"}}`.
fn label(entry: &Value, field: &str) -> Option<String> {
    entry
        .get(field)?
        .get("label")?
        .as_str()
        .map(str::to_string)
}
