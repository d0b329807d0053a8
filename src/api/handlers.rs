//! API Handlers
//!
//! HTTP request handlers backed by the token cache.

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};

use crate::cache::TokenCache;
use crate::error::{CacheError, Result};
use crate::models::{CleanupResponse, HealthResponse, StatsResponse, TokenResponse};
use crate::token::VerificationKey;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the running token cache
    pub cache: TokenCache,
    /// Key for the verify endpoint; `None` disables it
    pub verification_key: Option<Arc<VerificationKey>>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: TokenCache, verification_key: Option<VerificationKey>) -> Self {
        Self {
            cache,
            verification_key: verification_key.map(Arc::new),
        }
    }
}

/// Handler for GET /token/decode
///
/// Returns the claims of the request's bearer token without checking its signature.
pub async fn decode_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>> {
    let token = state.cache.request_decode(&headers).await?;
    Ok(Json(TokenResponse::new(&token)))
}

/// Handler for GET /token/verify
///
/// Returns the claims of the request's bearer token after verifying it.
pub async fn verify_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>> {
    let key = state
        .verification_key
        .as_deref()
        .ok_or_else(|| CacheError::Unavailable("no verification key configured".to_string()))?;

    let token = state.cache.request_verify(&headers, key).await?;
    Ok(Json(TokenResponse::new(&token)))
}

/// Handler for POST /cache/cleanup
pub async fn cleanup_handler(State(state): State<AppState>) -> Result<Json<CleanupResponse>> {
    state.cache.cleanup().await?;
    let remaining = state.cache.len().await?;
    Ok(Json(CleanupResponse::new(remaining)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.cache.stats().await?;
    Ok(Json(StatsResponse::from(stats)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::error::TokenError;
    use axum::http::{header::AUTHORIZATION, HeaderValue};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    fn state(key: Option<VerificationKey>) -> AppState {
        let (cache, _worker) = TokenCache::start(CacheConfig::default(), CancellationToken::new());
        AppState::new(cache, key)
    }

    fn bearer(raw: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {raw}")).unwrap(),
        );
        headers
    }

    fn mint(secret: &[u8]) -> String {
        encode(
            &Header::default(),
            &json!({"sub": "carol"}),
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_decode_handler() {
        let state = state(None);
        let raw = mint(b"anything");

        let response = decode_handler(State(state), bearer(&raw)).await.unwrap();
        assert_eq!(response.claims.sub.as_deref(), Some("carol"));
        assert!(!response.verified);
    }

    #[tokio::test]
    async fn test_verify_handler_without_key() {
        let state = state(None);
        let raw = mint(b"anything");

        let result = verify_handler(State(state), bearer(&raw)).await;
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_verify_handler_with_key() {
        let state = state(Some(VerificationKey::hmac(b"handler-secret")));

        let good = verify_handler(State(state.clone()), bearer(&mint(b"handler-secret"))).await;
        assert!(good.unwrap().verified);

        let bad = verify_handler(State(state), bearer(&mint(b"forged"))).await;
        assert!(matches!(
            bad,
            Err(CacheError::Token(TokenError::InvalidSignature))
        ));
    }

    #[tokio::test]
    async fn test_cleanup_and_stats_handlers() {
        let state = state(None);
        decode_handler(State(state.clone()), bearer(&mint(b"x")))
            .await
            .unwrap();

        let cleanup = cleanup_handler(State(state.clone())).await.unwrap();
        assert_eq!(cleanup.total_entries, 1);

        let stats = stats_handler(State(state)).await.unwrap();
        assert_eq!(stats.sweeps, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
