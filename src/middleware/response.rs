use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::ApiError;
use crate::filter::Pagination;

/// Wrapper for API responses that automatically adds the success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: String,
    pub status_code: StatusCode,
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::with_status(data, message, StatusCode::OK)
    }

    pub fn with_status(data: T, message: impl Into<String>, status_code: StatusCode) -> Self {
        Self {
            data,
            message: message.into(),
            status_code,
            pagination: None,
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(data, message, StatusCode::CREATED)
    }

    pub fn paginated(data: T, message: impl Into<String>, pagination: Pagination) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::success(data, message)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return ApiError::Internal.into_response();
            }
        };

        let mut envelope = json!({
            "status": "success",
            "statusCode": self.status_code.as_u16(),
            "message": self.message,
            "data": data_value,
        });

        if let Some(pagination) = self.pagination {
            envelope["pagination"] = json!(pagination);
        }

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
