//! Bearer Token Extraction
//!
//! Pulls the credential out of an `Authorization: Bearer <token>` header.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::error::TokenError;

const BEARER_SCHEME: &str = "bearer";

/// Extracts the bearer token from request headers.
///
/// The scheme is matched case-insensitively. The token itself must be
/// non-empty and contain no whitespace.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, TokenError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(TokenError::MissingAuthorization)?;

    let value = value.to_str().map_err(|_| {
        TokenError::MalformedAuthorization("header is not valid ASCII".to_string())
    })?;

    let (scheme, token) = value.trim().split_once(' ').ok_or_else(|| {
        TokenError::MalformedAuthorization("expected `Bearer <token>`".to_string())
    })?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(TokenError::MalformedAuthorization(format!(
            "unsupported scheme `{scheme}`"
        )));
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(TokenError::MalformedAuthorization(
            "invalid bearer token format".to_string(),
        ));
    }

    Ok(token)
}
