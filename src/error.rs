// HTTP API error types
//
// Client-facing failures keep the original wire contract: HTTP 200 with the
// `errors` field of the envelope populated. Internal failures are the only
// ones that surface a 5xx, always with a generic message.
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::query::error::QueryError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    /// A guard ran before its declared prerequisites were resolved.
    /// Programmer error, never a client problem.
    #[error("guard precondition violated: {0}")]
    Precondition(String),

    #[error("storage failure: {0}")]
    Storage(String),

    /// An outbound provider reported failure.
    #[error("{0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn not_found(kind_label: &str) -> Self {
        ApiError::NotFound(format!("{} with the specified ID does not exist.", kind_label))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        ApiError::Precondition(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ApiError::Storage(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        ApiError::Upstream(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ApiError::Precondition(_) | ApiError::Storage(_) | ApiError::Internal(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_internal() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::OK
        }
    }

    /// The message that goes into the envelope. Internal details stay in logs.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Validation(msg)
            | ApiError::NotFound(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Upstream(msg) => msg.clone(),
            ApiError::Storage(_) => "Storage temporarily unavailable.".to_string(),
            ApiError::Precondition(_) | ApiError::Internal(_) => {
                "An unexpected error occurred while processing your request.".to_string()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if self.is_internal() {
            tracing::error!(error = %self, "request failed with internal error");
        }
        let body = json!({
            "data": null,
            "errors": [self.client_message()],
            "meta": {},
        });
        (self.status_code(), Json(body)).into_response()
    }
}
