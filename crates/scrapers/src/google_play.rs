//! Google Play adapter.
//!
//! Reviews come from the Play web UI's internal `batchexecute` RPC endpoint
//! (the same one the store frontend calls); the app description comes from
//! the public details page. Both payloads are undocumented, so extraction is
//! positional and every missing field maps to a typed error instead of a
//! panic.

use chrono::{DateTime, TimeZone, Utc};
use reviews::{Review, ReviewSource};
use serde_json::Value;

use crate::{build_client, ScrapeError};

const BATCHEXECUTE_PATH: &str = "/_/PlayStoreUi/data/batchexecute";
/// RPC id of the reviews listing call.
const REVIEWS_RPC_ID: &str = "UsvDTd";
/// Sort constant for newest-first, matching the store frontend.
const SORT_NEWEST: u8 = 2;

/// Client for Google Play reviews and app metadata.
pub struct GooglePlayClient {
    client: reqwest::Client,
    base_url: String,
}

impl GooglePlayClient {
    pub fn new() -> Result<Self, ScrapeError> {
        Ok(Self {
            client: build_client(30)?,
            base_url: "https://play.google.com".to_string(),
        })
    }

    /// Override the Play host, used by tests and proxies.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch up to `num_reviews` of the newest reviews for the given package
    /// name. Play issues review ids, so `review_id` is populated.
    pub async fn fetch_reviews(
        &self,
        app_id: &str,
        country: &str,
        num_reviews: usize,
    ) -> Result<Vec<Review>, ScrapeError> {
        let url = format!(
            "{}{}?hl={}&gl={}",
            self.base_url, BATCHEXECUTE_PATH, country, country
        );
        let envelope = reviews_envelope(app_id, num_reviews);
        let form = format!("f.req={}", urlencoding::encode(&envelope));
        tracing::debug!(%app_id, num_reviews, "fetching google play reviews");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/x-www-form-urlencoded;charset=UTF-8")
            .body(form)
            .send()
            .await
            .map_err(|e| ScrapeError::Request(format!("HTTP request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(ScrapeError::Request(format!(
                "HTTP error {} from play batchexecute",
                response.status()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::Request(format!("failed to read body: {e}")))?;

        let mut reviews = parse_reviews_response(&body, country)?;
        reviews.truncate(num_reviews);
        Ok(reviews)
    }

    /// Fetch the app's store description, or `None` when the page carries no
    /// description. Used only as fixed context for the overview prompt, so
    /// absence is not an error.
    pub async fn fetch_app_description(
        &self,
        app_id: &str,
        country: &str,
    ) -> Result<Option<String>, ScrapeError> {
        let url = format!(
            "{}/store/apps/details?id={}&hl=en&gl={}",
            self.base_url, app_id, country
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ScrapeError::Request(format!("HTTP request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(ScrapeError::Request(format!(
                "HTTP error {} from play details page",
                response.status()
            )));
        }
        let html = response
            .text()
            .await
            .map_err(|e| ScrapeError::Request(format!("failed to read body: {e}")))?;

        Ok(extract_meta_description(&html))
    }
}

/// Build the `f.req` envelope for the reviews RPC: newest-first, one page of
/// up to `count` reviews.
fn reviews_envelope(app_id: &str, count: usize) -> String {
    let inner = serde_json::to_string(&serde_json::json!([
        null,
        null,
        [2, SORT_NEWEST, [count, null, null], null, []],
        [app_id, 7]
    ]))
    .expect("static request shape serializes");
    serde_json::to_string(&serde_json::json!([[[REVIEWS_RPC_ID, inner, null, "generic"]]]))
        .expect("static request shape serializes")
}

/// Decode the double-encoded batchexecute response down to review records.
///
/// The body starts with an anti-JSON prefix line (`)]}'`), then a JSON array
/// whose `[0][2]` element is itself a JSON string holding the actual payload;
/// reviews sit at index 0 of that payload.
fn parse_reviews_response(body: &str, country: &str) -> Result<Vec<Review>, ScrapeError> {
    let json_start = body.find('[').ok_or_else(|| {
        ScrapeError::UnexpectedPayload("no JSON array in batchexecute response".into())
    })?;
    let outer: Value = serde_json::from_str(&body[json_start..])
        .map_err(|e| ScrapeError::UnexpectedPayload(format!("invalid outer JSON: {e}")))?;

    let payload_str = outer
        .get(0)
        .and_then(|chunk| chunk.get(2))
        .and_then(Value::as_str)
        .ok_or_else(|| ScrapeError::UnexpectedPayload("missing payload string".into()))?;

    let payload: Value = serde_json::from_str(payload_str)
        .map_err(|e| ScrapeError::UnexpectedPayload(format!("invalid inner JSON: {e}")))?;

    let entries = match payload.get(0) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ScrapeError::UnexpectedPayload(format!(
                "unexpected reviews shape: {other:?}"
            )))
        }
    };

    entries
        .iter()
        .map(|entry| parse_review_entry(entry, country))
        .collect()
}

fn parse_review_entry(entry: &Value, country: &str) -> Result<Review, ScrapeError> {
    let review_id = entry
        .get(0)
        .and_then(Value::as_str)
        .ok_or_else(|| ScrapeError::UnexpectedPayload("missing review id".into()))?;
    let user_name = entry
        .get(1)
        .and_then(|v| v.get(0))
        .and_then(Value::as_str)
        .ok_or_else(|| ScrapeError::UnexpectedPayload("missing user name".into()))?;
    let rating = entry
        .get(2)
        .and_then(Value::as_u64)
        .ok_or_else(|| ScrapeError::UnexpectedPayload("missing rating".into()))?;
    let rating = u8::try_from(rating)
        .map_err(|_| ScrapeError::UnexpectedPayload(format!("rating out of range: {rating}")))?;
    let review_text = entry.get(4).and_then(Value::as_str).unwrap_or_default();
    let timestamp = entry
        .get(5)
        .and_then(|v| v.get(0))
        .and_then(Value::as_i64)
        .ok_or_else(|| ScrapeError::UnexpectedPayload("missing timestamp".into()))?;
    let date: DateTime<Utc> = Utc
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| ScrapeError::UnexpectedPayload(format!("bad timestamp: {timestamp}")))?;

    Review::new(
        Some(review_id.to_string()),
        ReviewSource::GooglePlayMarket,
        user_name,
        country,
        rating,
        review_text,
        date,
    )
    .map_err(|e| ScrapeError::UnexpectedPayload(e.to_string()))
}

/// Pull the `og:description` meta tag out of the details page.
fn extract_meta_description(html: &str) -> Option<String> {
    let marker = "property=\"og:description\"";
    let tag_start = html.find(marker)?;
    let rest = &html[tag_start + marker.len()..];
    let content_marker = "content=\"";
    let content_start = rest.find(content_marker)? + content_marker.len();
    let content_rest = &rest[content_start..];
    let content_end = content_rest.find('"')?;
    let description = content_rest[..content_end].trim();
    if description.is_empty() {
        None
    } else {
        Some(description.to_string())
    }
}
