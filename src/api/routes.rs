//! API Routes
//!
//! Configures the Axum router with all token cache endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_handler, decode_handler, health_handler, stats_handler, verify_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /token/decode` - Claims of the bearer token, unverified
/// - `GET /token/verify` - Claims of the bearer token, verified
/// - `POST /cache/cleanup` - Force a cleanup pass
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/token/decode", get(decode_handler))
        .route("/token/verify", get(verify_handler))
        .route("/cache/cleanup", post(cleanup_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
