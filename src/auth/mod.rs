use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::config;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub handle: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: Uuid, handle: String, role: String) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        Self {
            sub,
            handle,
            role,
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token generation error: {0}")]
    Generation(String),

    #[error("signing secret is not configured")]
    MissingSecret,
}

pub fn issue_token(claims: &Claims) -> Result<String, TokenError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| TokenError::Generation(e.to_string()))
}

/// Hex-encoded SHA-256 digest used for stored credentials.
pub fn password_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_and_hex() {
        let a = password_digest("hunter2");
        let b = password_digest("hunter2");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, password_digest("hunter3"));
    }

    #[test]
    fn issued_token_has_three_segments() {
        let claims = Claims::new(Uuid::new_v4(), "alice".into(), "user".into());
        let token = issue_token(&claims).expect("dev secret is configured");
        assert_eq!(token.split('.').count(), 3);
    }
}
