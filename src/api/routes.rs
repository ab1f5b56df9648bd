//! API Routes
//!
//! Configures the Axum router with all tool server endpoints.

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    call_tool_handler, clear_cache_handler, health_handler, list_tools_handler, stats_handler,
    AppState,
};
use super::middleware::rate_limit;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /tools/:name` - Invoke a tool (rate limited)
/// - `GET /tools` - List tool names (rate limited)
/// - `DELETE /cache` - Clear the response cache (rate limited)
/// - `GET /stats` - Cache and limiter statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Rate limiting: keyed by the `x-client-id` header
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let limited = Router::new()
        .route("/tools", get(list_tools_handler))
        .route("/tools/:name", post(call_tool_handler))
        .route("/cache", delete(clear_cache_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .merge(limited)
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::Config;
    use crate::error::Result;
    use crate::upstream::Fetcher;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    struct EmptyFetcher;

    #[async_trait]
    impl Fetcher for EmptyFetcher {
        async fn fetch_json(&self, _url: &str) -> Result<Value> {
            Ok(json!([]))
        }
    }

    fn create_test_app() -> Router {
        let state = AppState::from_config(
            &Config::default(),
            Arc::new(EmptyFetcher),
            Arc::new(ManualClock::new(0)),
        );
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint_needs_no_client_id() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_tool_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tools/getLiveTimingData")
                    .header("x-client-id", "router-test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "59");
    }

    #[tokio::test]
    async fn test_tool_endpoint_without_client_id() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tools/getLiveTimingData")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tools/nonexistent")
                    .header("x-client-id", "router-test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
