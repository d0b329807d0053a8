//! Token Claims Module
//!
//! Defines the decoded token and its time-window validity check.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::Header;
use serde::{Deserialize, Serialize};

// == Claims ==
/// Registered claims the cache cares about, plus everything else the token carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience (string or array, kept as raw JSON)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
    /// Expiration time (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Not before (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Issued at (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// All remaining claims
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// == Token ==
/// A parsed bearer token.
///
/// The raw serialized form is the token's identity and the cache key.
#[derive(Debug, Clone)]
pub struct Token {
    raw: String,
    header: Header,
    claims: Claims,
    verified: bool,
}

impl Token {
    // == Constructor ==
    /// Assembles a token from its parsed parts.
    ///
    /// # Arguments
    /// * `raw` - The serialized token string
    /// * `header` - The decoded JOSE header
    /// * `claims` - The decoded claims
    /// * `verified` - Whether the signature was checked
    pub fn new(raw: impl Into<String>, header: Header, claims: Claims, verified: bool) -> Self {
        Self {
            raw: raw.into(),
            header,
            claims,
            verified,
        }
    }

    /// Raw serialized form.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// True when the token came out of `verify` rather than `decode`.
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    // == Is Valid ==
    /// Checks the not-before/expiration window against the current time.
    ///
    /// The leeway widens the window symmetrically and is applied in whole
    /// seconds. Both bounds are inclusive, matching what [`verify`] accepts,
    /// so a token that verifies is also cacheable. Absent claims do not
    /// constrain the window.
    ///
    /// [`verify`]: crate::token::verify
    pub fn is_valid(&self, leeway: Duration) -> bool {
        self.is_valid_at(Utc::now().timestamp(), leeway)
    }

    /// Same as [`Token::is_valid`] against an explicit Unix timestamp.
    pub fn is_valid_at(&self, now: i64, leeway: Duration) -> bool {
        let leeway = i64::try_from(leeway.as_secs()).unwrap_or(i64::MAX);

        if let Some(nbf) = self.claims.nbf {
            if now.saturating_add(leeway) < nbf {
                return false;
            }
        }

        match self.claims.exp {
            Some(exp) => now.saturating_sub(leeway) <= exp,
            None => true,
        }
    }
}
