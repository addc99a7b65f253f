use axum::extract::{Json, State};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::catalog::EntityKind;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::query::predicate::Predicate;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Value> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required."));
    }

    let predicate = Predicate::eq("email", Value::String(payload.email.clone()));
    let user = state
        .store
        .find_one(EntityKind::User, &predicate)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password."))?;

    let stored_digest = user.get("passwordHash").and_then(Value::as_str).unwrap_or_default();
    if stored_digest != auth::password_digest(&payload.password) {
        tracing::warn!("failed login attempt for '{}'", payload.email);
        return Err(ApiError::unauthorized("Invalid email or password."));
    }

    let user_id = user
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ApiError::internal("user record has no valid id"))?;
    let handle = user.get("handle").and_then(Value::as_str).unwrap_or_default().to_string();
    let role = user.get("role").and_then(Value::as_str).unwrap_or("user").to_string();

    let claims = Claims::new(user_id, handle.clone(), role.clone());
    let expires_at = claims.exp;
    let token = auth::issue_token(&claims).map_err(|e| {
        tracing::error!("token issuance failed: {}", e);
        ApiError::internal("failed to issue token")
    })?;

    tracing::debug!("issued token for {} ({})", handle, user_id);

    Ok(ApiResponse::success(json!({
        "token": token,
        "expiresAt": expires_at,
        "user": {
            "id": user_id.to_string(),
            "displayName": user.get("displayName").cloned().unwrap_or(Value::Null),
            "handle": handle,
            "role": role,
        },
    })))
}
