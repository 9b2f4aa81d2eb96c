use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use reviewscope::{
    aggregate, label_reviews, summarize, AppContext, MetricsReport, Review, ReviewSource,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query parameters for the review analysis endpoint
#[derive(Debug, Deserialize)]
pub struct ReviewsQuery {
    /// Display name of the app, used as context for the overview
    pub app_name: String,

    /// Marketplace identifier: numeric ID for the App Store, package name
    /// for Google Play
    pub app_id: String,

    /// Two-letter storefront country code
    #[serde(default = "default_country")]
    pub country: String,

    /// How many of the most recent reviews to analyze
    #[serde(default = "default_num_reviews")]
    pub num_reviews: usize,

    /// Which marketplace to fetch from
    #[serde(default)]
    pub reviews_source: ReviewSource,

    #[serde(default = "default_true")]
    pub include_llm_overview: bool,

    #[serde(default = "default_true")]
    pub include_metrics: bool,

    #[serde(default = "default_true")]
    pub include_raw_data: bool,
}

fn default_country() -> String {
    "us".to_string()
}

fn default_num_reviews() -> usize {
    100
}

fn default_true() -> bool {
    true
}

/// Response from the review analysis endpoint. Sections the caller did not
/// ask for are omitted from the JSON entirely.
#[derive(Debug, Default, Serialize)]
pub struct ReviewsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_overview: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsReport>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<RawData>,
}

/// Labeled review records as fetched, wrapped for the response body
#[derive(Debug, Serialize)]
pub struct RawData {
    pub reviews: Vec<Review>,
}

/// Fetch and analyze app reviews.
///
/// GET /app-reviews
///
/// Fetches the newest reviews from the requested marketplace, labels each
/// one with a sentiment, then produces whichever of the three result
/// sections the caller asked for: the generated overview, the aggregate
/// metrics report, and the labeled records themselves.
///
/// Returns 404 when the marketplace has no reviews for the given
/// parameters, and 502 when a marketplace, the sentiment API, or the chat
/// model fails.
pub async fn app_reviews(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ReviewsQuery>,
) -> ServerResult<impl IntoResponse> {
    let max = state.config.max_num_reviews;
    if query.num_reviews == 0 || query.num_reviews > max {
        return Err(ServerError::BadRequest(format!(
            "num_reviews must be between 1 and {max}"
        )));
    }

    tracing::info!(
        app_name = %query.app_name,
        app_id = %query.app_id,
        country = %query.country,
        num_reviews = query.num_reviews,
        source = %query.reviews_source,
        "fetching app reviews"
    );

    let fetched = match query.reviews_source {
        ReviewSource::AppStore => {
            state
                .app_store
                .fetch_reviews(&query.app_id, &query.country, query.num_reviews)
                .await?
        }
        ReviewSource::GooglePlayMarket => {
            state
                .google_play
                .fetch_reviews(&query.app_id, &query.country, query.num_reviews)
                .await?
        }
    };

    if fetched.is_empty() {
        tracing::warn!(app_id = %query.app_id, "no reviews found");
        return Err(ServerError::NoReviews);
    }
    tracing::info!(count = fetched.len(), "fetched reviews");

    // Every result section needs labeled records, so labeling is unconditional.
    let reviews = label_reviews(fetched, state.labeler.as_ref()).await?;
    tracing::debug!("sentiment labeling completed");

    let mut response = ReviewsResponse::default();

    if query.include_llm_overview {
        let ctx = AppContext {
            name: query.app_name.clone(),
            description: fetch_description(&state, &query).await,
        };
        response.llm_overview =
            Some(summarize(&reviews, &ctx, state.chat.as_ref(), &state.summarizer).await?);
        tracing::debug!("overview generation completed");
    }

    if query.include_metrics {
        response.metrics = Some(aggregate(&reviews)?);
        tracing::debug!("metrics calculation completed");
    }

    if query.include_raw_data {
        response.raw_data = Some(RawData { reviews });
    }

    Ok(Json(response))
}

/// Best-effort app description for the overview prompt. Only Google Play
/// exposes one; a fetch failure degrades to an empty description rather
/// than failing the request.
async fn fetch_description(state: &ServerState, query: &ReviewsQuery) -> String {
    match query.reviews_source {
        ReviewSource::GooglePlayMarket => state
            .google_play
            .fetch_app_description(&query.app_id, &query.country)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "app description fetch failed");
                None
            })
            .unwrap_or_default(),
        ReviewSource::AppStore => String::new(),
    }
}
