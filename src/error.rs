//! Error types for the token cache
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Token Error Enum ==
/// Failures from the token collaborators: extraction, decoding, verification.
#[derive(Error, Debug)]
pub enum TokenError {
    /// No Authorization header on the request
    #[error("Missing authorization header")]
    MissingAuthorization,

    /// Authorization header present but not `Bearer <token>`
    #[error("Malformed authorization header: {0}")]
    MalformedAuthorization(String),

    /// Token could not be parsed
    #[error("Failed to decode token: {0}")]
    Decode(String),

    /// Signature check failed
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Expiration is in the past
    #[error("Token expired")]
    Expired,

    /// Not-before is in the future
    #[error("Token not yet valid")]
    NotYetValid,

    /// Issuer, audience or algorithm did not match the verification key
    #[error("Invalid claims: {0}")]
    InvalidClaims(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::MissingRequiredClaim(_) => Self::InvalidClaims(err.to_string()),
            _ => Self::Decode(err.to_string()),
        }
    }
}

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The worker did not acknowledge the operation in time
    #[error("Dispatch timeout: {operation} not acknowledged within {timeout:?}")]
    DispatchTimeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// Extraction, decoding or verification failed
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Service is not set up to handle the request
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl CacheError {
    /// Only a dispatch timeout is worth retrying; the worker is not assumed dead.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CacheError::DispatchTimeout { .. })
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::DispatchTimeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Token(_) => StatusCode::UNAUTHORIZED,
            CacheError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
