use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::auth::Claims;
use crate::config;
use crate::error::ApiError;

/// Authenticated caller, resolved from the bearer token and injected into
/// request extensions for guards and handlers.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: Uuid,
    pub handle: String,
    pub role: String,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            handle: claims.handle,
            role: claims.role,
        }
    }
}

/// Token authentication middleware for the protected API routes.
pub async fn auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).map_err(ApiError::unauthorized)?;
    let claims = validate_token(&token).map_err(ApiError::unauthorized)?;

    request.extensions_mut().insert(Principal::from(claims));
    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

fn validate_token(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err("Token secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| format!("Invalid token: {}", e))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{issue_token, Claims};

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer(&headers).is_err());

        headers.insert("authorization", "Basic abc".parse().unwrap());
        assert!(extract_bearer(&headers).is_err());

        headers.insert("authorization", "Bearer  ".parse().unwrap());
        assert!(extract_bearer(&headers).is_err());

        headers.insert("authorization", "Bearer tok123".parse().unwrap());
        assert_eq!(extract_bearer(&headers).unwrap(), "tok123");
    }

    #[test]
    fn issued_tokens_validate_back_to_the_same_principal() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "alice".into(), "admin".into());
        let token = issue_token(&claims).unwrap();

        let decoded = validate_token(&token).unwrap();
        let principal = Principal::from(decoded);
        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.handle, "alice");
        assert_eq!(principal.role, "admin");

        assert!(validate_token("not-a-token").is_err());
    }
}
