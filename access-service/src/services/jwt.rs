//! Token service - issuance and validation of signed access tokens.
//!
//! Tokens are stateless JWTs signed with HMAC-SHA256 over a configured
//! symmetric secret; validity is determined entirely by the signature and
//! the [nbf, exp] window. The secret never leaves the service and is
//! never logged.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TokenConfig;
use crate::models::User;

/// Typed validation failures. All of them are treated as Unauthenticated
/// at the pipeline boundary; the distinction feeds logs and tests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("token signature mismatch")]
    BadSignature,

    #[error("token issuer mismatch")]
    IssuerMismatch,

    #[error("token audience mismatch")]
    AudienceMismatch,

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user id)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Role name
    pub role: String,
    /// Display name
    pub name: String,
}

/// Result of token issuance. The refresh token is an opaque identifier
/// with no embedded meaning; rotation is an external concern.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    access_token_expiry_minutes: i64,
    clock_skew_seconds: u64,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_expiry_minutes: config.access_token_expiry_minutes,
            clock_skew_seconds: config.clock_skew_seconds,
        }
    }

    /// Issue an access token for the user plus an opaque refresh
    /// identifier (random 128 bits, hex-encoded).
    pub fn issue(&self, user: &User, role_name: &str) -> Result<IssuedTokens, anyhow::Error> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.access_token_expiry_minutes);

        let claims = AccessClaims {
            sub: user.user_id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
            role: role_name.to_string(),
            name: user.display_name.clone(),
        };

        let header = Header::new(Algorithm::HS256);
        let access_token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))?;

        let mut refresh_bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut refresh_bytes);

        Ok(IssuedTokens {
            access_token,
            expires_at,
            refresh_token: hex::encode(refresh_bytes),
        })
    }

    /// Validate a token and return its claims.
    ///
    /// Rejects signature mismatches, issuer/audience differences from the
    /// configured values, and any current time outside [nbf, exp]
    /// adjusted by the configured clock-skew leeway.
    pub fn validate(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_nbf = true;
        validation.leeway = self.clock_skew_seconds;

        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::ImmatureSignature => TokenError::NotYetValid,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::InvalidIssuer => TokenError::IssuerMismatch,
                ErrorKind::InvalidAudience => TokenError::AudienceMismatch,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Access token lifetime in seconds (for client responses).
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_token_expiry_minutes * 60
    }
}
