//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (auth, logging, compression, etc.)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{api_key_auth, log_requests, request_id};
use crate::routes::{api_info, health, not_found, reviews};
use crate::state::ServerState;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Routes are divided into:
/// - Public routes: /, /health, /ready (no auth required)
/// - Protected routes: /app-reviews (API key required when keys are configured)
pub fn build_router(state: Arc<ServerState>) -> Router {
    // CORS layer
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check));

    // Protected routes (require API key when configured)
    let protected_routes = Router::new()
        .route("/app-reviews", get(reviews::app_reviews))
        .layer(from_fn_with_state(state.clone(), api_key_auth));

    // Combine routes
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(state.config.timeout_secs),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(request_id))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the reviewscope HTTP server
///
/// Initializes structured logging, builds every outbound client once, and
/// serves until shut down via SIGTERM or Ctrl+C.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    // Create server state
    let state = Arc::new(ServerState::new(config.clone())?);

    // Build router
    let app = build_router(state);

    // Parse bind address
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting reviewscope server on {} with {} API keys",
        addr,
        config.api_keys.len()
    );
    tracing::info!(
        "Timeout: {}s, num_reviews cap: {}",
        config.timeout_secs,
        config.max_num_reviews
    );
    tracing::info!("CORS: {}", config.enable_cors);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use reviewscope::{
        AppStoreClient, ChatError, ChatModel, GooglePlayClient, Sentiment, SentimentError,
        SentimentLabeler, SummarizerConfig,
    };
    use tower::ServiceExt;

    struct UnusedLabeler;

    #[async_trait]
    impl SentimentLabeler for UnusedLabeler {
        async fn label(&self, texts: &[String]) -> Result<Vec<Sentiment>, SentimentError> {
            Ok(vec![Sentiment::Neutral; texts.len()])
        }
    }

    struct UnusedModel;

    #[async_trait]
    impl ChatModel for UnusedModel {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ChatError> {
            Err(ChatError::Request("no network in tests".to_string()))
        }
    }

    fn test_state(config: ServerConfig) -> Arc<ServerState> {
        Arc::new(ServerState::with_components(
            config,
            AppStoreClient::new().unwrap(),
            GooglePlayClient::new().unwrap(),
            Arc::new(UnusedLabeler),
            Arc::new(UnusedModel),
            SummarizerConfig::default(),
        ))
    }

    #[tokio::test]
    async fn health_needs_no_api_key() {
        let mut config = ServerConfig::default();
        config.api_keys.insert("secret".to_string());
        let app = build_router(test_state(config));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn analysis_route_rejects_missing_key_when_auth_is_on() {
        let mut config = ServerConfig::default();
        config.api_keys.insert("secret".to_string());
        let app = build_router(test_state(config));

        let response = app
            .oneshot(
                Request::get("/app-reviews?app_name=x&app_id=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn analysis_route_rejects_wrong_key() {
        let mut config = ServerConfig::default();
        config.api_keys.insert("secret".to_string());
        let app = build_router(test_state(config));

        let response = app
            .oneshot(
                Request::get("/app-reviews?app_name=x&app_id=1")
                    .header("x-api-key", "not-the-key")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn out_of_range_num_reviews_is_a_bad_request() {
        // Auth disabled, validation fails before any network call.
        let app = build_router(test_state(ServerConfig::default()));

        let response = app
            .oneshot(
                Request::get("/app-reviews?app_name=x&app_id=1&num_reviews=5000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let app = build_router(test_state(ServerConfig::default()));

        let response = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
