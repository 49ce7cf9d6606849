use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;
use crate::models::User;

/// Identity facts embedded in a session token.
///
/// Reconstructed on every verification; never stored server-side. The token
/// itself is the full session state, so verification does no store lookup.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject of the token: the user's unique id.
    pub sub: String,
    pub username: String,
    pub theme: i32,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Why a token failed verification. The middleware collapses all three into a
/// 401, but the kinds stay distinct for callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// The string could not be parsed or decoded as a token.
    Malformed,
    /// The signature check failed.
    SignatureInvalid,
    /// The token was valid once but its expiry has passed.
    Expired,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "token malformed"),
            TokenError::SignatureInvalid => write!(f, "token signature invalid"),
            TokenError::Expired => write!(f, "token expired"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Issues and verifies signed, time-bound session tokens.
///
/// Built once from [`Config`](crate::config::Config) at startup and shared as
/// application data. The secret is never read from the environment at request
/// time and never rotated while the process runs; rotation would invalidate
/// all live tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_hours: i64,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token is invalid the second it passes `exp`.
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
            validation,
        }
    }

    /// Signs a token carrying the user's identity claim.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let expiry = now
            .checked_add_signed(chrono::Duration::hours(self.ttl_hours))
            .ok_or_else(|| AppError::InternalServerError("token expiry overflow".into()))?;

        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            theme: user.theme,
            iat: now.timestamp() as usize,
            exp: expiry.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AppError::InternalServerError(format!("failed to generate token: {}", e))
        })
    }

    /// Verifies a token string and decodes its claim. Pure and side-effect
    /// free; the only time dependency is the expiry comparison.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            })
    }
}
