use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod password;

pub use password::{PasswordError, PasswordHasher};

/// Claims embedded in every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Token not provided")]
    Missing,

    #[error("Token has expired")]
    Expired,

    #[error("Token is invalid")]
    Invalid,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
}

/// Issues and verifies HS256 tokens with a fixed lifetime.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: &str, email: &str, username: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| JwtError::TokenGeneration("token expiry is out of range".to_string()))?;
        let claims = Claims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Stateless: a well-signed, unexpired token is accepted without checking
    /// that its user still exists.
    pub fn verify(&self, token: Option<&str>) -> Result<Claims, JwtError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty()).ok_or(JwtError::Missing)?;

        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid,
            })
    }
}
