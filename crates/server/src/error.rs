use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reviewscope::{MetricsError, OverviewError, ScrapeError, SentimentError};
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("No reviews found")]
    NoReviews,

    #[error("Scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("Sentiment error: {0}")]
    Sentiment(#[from] SentimentError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Overview error: {0}")]
    Overview(#[from] OverviewError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NoReviews | ServerError::NotFound => StatusCode::NOT_FOUND,
            // An empty aggregation input means nothing was found upstream.
            ServerError::Metrics(MetricsError::NoData) => StatusCode::NOT_FOUND,
            ServerError::Metrics(_) => StatusCode::UNPROCESSABLE_ENTITY,
            // Upstream collaborators (marketplaces, sentiment API, chat model)
            // misbehaving is a gateway failure, not a client error.
            ServerError::Scrape(_) | ServerError::Sentiment(_) | ServerError::Overview(_) => {
                StatusCode::BAD_GATEWAY
            }
            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::Authentication(_) => "AUTH_FAILED",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::NoReviews => "NO_REVIEWS",
            ServerError::Scrape(_) => "SCRAPE_ERROR",
            ServerError::Sentiment(_) => "SENTIMENT_ERROR",
            ServerError::Metrics(MetricsError::NoData) => "NO_REVIEWS",
            ServerError::Metrics(_) => "METRICS_ERROR",
            ServerError::Overview(_) => "OVERVIEW_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        });

        (status, body).into_response()
    }
}

impl From<reviewscope::PipelineError> for ServerError {
    fn from(err: reviewscope::PipelineError) -> Self {
        match err {
            reviewscope::PipelineError::Sentiment(e) => ServerError::Sentiment(e),
            reviewscope::PipelineError::Metrics(e) => ServerError::Metrics(e),
            reviewscope::PipelineError::Overview(e) => ServerError::Overview(e),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}
