//! Response DTOs for the token cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::token::{Claims, Token};

/// Response body for the token endpoints (GET /token/decode, GET /token/verify)
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    /// Whether the signature was checked
    pub verified: bool,
    /// Signing algorithm named in the header
    pub algorithm: String,
    /// Expiration as an RFC 3339 timestamp, if the token carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// All decoded claims
    pub claims: Claims,
}

impl TokenResponse {
    /// Creates a new TokenResponse from a parsed token
    pub fn new(token: &Token) -> Self {
        let expires_at = token
            .claims()
            .exp
            .and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0))
            .map(|at| at.to_rfc3339());

        Self {
            verified: token.is_verified(),
            algorithm: format!("{:?}", token.header().alg),
            expires_at,
            claims: token.claims().clone(),
        }
    }
}

/// Response body for the cleanup endpoint (POST /cache/cleanup)
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    /// Success message
    pub message: String,
    /// Entries left after the pass
    pub total_entries: usize,
}

impl CleanupResponse {
    /// Creates a new CleanupResponse
    pub fn new(total_entries: usize) -> Self {
        Self {
            message: "Cleanup completed".to_string(),
            total_entries,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Number of cleanup passes
    pub sweeps: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            sweeps: stats.sweeps,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::Header;

    #[test]
    fn test_token_response_from_token() {
        let claims = Claims {
            sub: Some("alice".to_string()),
            exp: Some(0),
            ..Claims::default()
        };
        let token = Token::new("raw", Header::default(), claims, true);

        let resp = TokenResponse::new(&token);
        assert!(resp.verified);
        assert_eq!(resp.algorithm, "HS256");
        assert_eq!(resp.expires_at.as_deref(), Some("1970-01-01T00:00:00+00:00"));

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["claims"]["sub"], "alice");
    }

    #[test]
    fn test_token_response_without_exp() {
        let token = Token::new("raw", Header::default(), Claims::default(), false);
        let json = serde_json::to_string(&TokenResponse::new(&token)).unwrap();
        assert!(!json.contains("expires_at"));
    }

    #[test]
    fn test_stats_response_from_stats() {
        let mut stats = CacheStats::new();
        for _ in 0..4 {
            stats.record_hit();
        }
        stats.record_miss();
        stats.set_total_entries(3);

        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.total_entries, 3);
    }

    #[test]
    fn test_cleanup_response_serialize() {
        let json = serde_json::to_string(&CleanupResponse::new(2)).unwrap();
        assert!(json.contains("Cleanup completed"));
        assert!(json.contains("\"total_entries\":2"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
