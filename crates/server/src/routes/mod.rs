//! API route handlers
//!
//! - `health`: Liveness and readiness probes
//! - `reviews`: Review fetching and analysis

pub mod health;
pub mod reviews;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Root endpoint (GET /), no authentication required.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "reviewscope",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/app-reviews",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler for undefined routes
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
