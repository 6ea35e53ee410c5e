//! Bearer token signing and verification.

use chrono::{Duration, Utc};
use common::Role;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Principal;
use crate::error::DomainError;

/// Token signing configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret shared by signer and verifier.
    pub secret: String,
    /// Token lifetime in seconds.
    pub expiration_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: "superSecretKey".to_string(),
            expiration_secs: 3600,
        }
    }
}

/// Claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    /// Staff id or customer code.
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Token verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Signs a token for `principal` valid for the configured lifetime.
    pub fn issue(&self, principal: &Principal) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = Claims {
            username: principal.username().to_string(),
            sub: principal.subject_id(),
            role: principal.role(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.config.expiration_secs)).timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, DomainError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| DomainError::Internal(format!("token signing failed: {e}")))
    }

    /// Checks the signature and expiry and returns the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("expiration_secs", &self.config.expiration_secs)
            .finish_non_exhaustive()
    }
}
