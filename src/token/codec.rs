//! Token Codec Module
//!
//! Parses raw bearer tokens into [`Token`] values, with or without
//! signature verification.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::error::TokenError;
use crate::token::{Claims, Token};

// == Verification Key ==
/// Key material and expectations used by [`verify`].
#[derive(Clone)]
pub struct VerificationKey {
    key: DecodingKey,
    algorithm: Algorithm,
    issuer: Option<String>,
    audience: Option<Vec<String>>,
}

impl VerificationKey {
    /// HMAC key for HS256.
    pub fn hmac(secret: &[u8]) -> Self {
        Self::new(DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    /// RSA public key in PEM form for RS256.
    pub fn rsa_pem(pem: &[u8]) -> Result<Self, TokenError> {
        let key = DecodingKey::from_rsa_pem(pem)?;
        Ok(Self::new(key, Algorithm::RS256))
    }

    pub fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        Self {
            key,
            algorithm,
            issuer: None,
            audience: None,
        }
    }

    /// Requires the `iss` claim to match.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Requires the `aud` claim to contain one of the given values.
    pub fn with_audience(mut self, audience: Vec<String>) -> Self {
        self.audience = Some(audience);
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn validation(&self, leeway: Duration) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = leeway.as_secs();
        validation.validate_nbf = true;
        // Tokens without `exp` are allowed; the cache bounds them by idle time
        validation.required_spec_claims.clear();

        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &self.audience {
            Some(audience) => validation.set_audience(audience.as_slice()),
            None => validation.validate_aud = false,
        }
        validation
    }
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

// == Decode ==
/// Parses a token without checking its signature or its time window.
pub fn decode(raw: &str) -> Result<Token, TokenError> {
    let header = jsonwebtoken::decode_header(raw)?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<Claims>(raw, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(Token::new(raw, data.header, data.claims, false))
}

// == Verify ==
/// Parses a token and checks its signature, time window (widened by
/// `leeway`) and any issuer/audience pinned on the key.
pub fn verify(raw: &str, key: &VerificationKey, leeway: Duration) -> Result<Token, TokenError> {
    let data = jsonwebtoken::decode::<Claims>(raw, &key.key, &key.validation(leeway))?;
    Ok(Token::new(raw, data.header, data.claims, true))
}
