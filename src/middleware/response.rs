use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::query::pagination::PaginationMeta;

/// Success half of the response envelope. Every endpoint answers with
/// `{ data, errors, meta }`; exactly one of `data`/`errors` is non-null.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    data: T,
    pagination: Option<PaginationMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { data, pagination: None }
    }

    pub fn paginated(data: T, pagination: PaginationMeta) -> Self {
        Self { data, pagination: Some(pagination) }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "data": null,
                        "errors": ["An unexpected error occurred while processing your request."],
                        "meta": {},
                    })),
                )
                    .into_response();
            }
        };

        let meta = match self.pagination {
            Some(pagination) => json!({ "pagination": pagination }),
            None => json!({}),
        };

        Json(json!({
            "data": data,
            "errors": null,
            "meta": meta,
        }))
        .into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
