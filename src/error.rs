// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::JwtError;
use crate::database::manager::DatabaseError;
use crate::services::AuthError;
use crate::validators::ValidationResult;

const INTERNAL_MESSAGE: &str = "An error occurred while processing your request";

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation { message: String, details: Vec<String> },
    InvalidJson(String),
    InvalidQuery(String),
    InvalidId,

    // 401 Unauthorized
    InvalidCredentials,
    TokenMissing,
    TokenInvalid,
    TokenExpired,

    // 404 Not Found
    NotFound(String),
    RouteNotFound,

    // 409 Conflict
    UserAlreadyExists,

    // 413 Payload Too Large
    PayloadTooLarge,

    // 500 Internal Server Error
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. }
            | ApiError::InvalidJson(_)
            | ApiError::InvalidQuery(_)
            | ApiError::InvalidId => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials
            | ApiError::TokenMissing
            | ApiError::TokenInvalid
            | ApiError::TokenExpired => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::UserAlreadyExists => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::InvalidQuery(msg) => msg,
            ApiError::InvalidId => "Invalid todo id",
            ApiError::InvalidCredentials => "Invalid email or password",
            ApiError::TokenMissing => "Token not provided",
            ApiError::TokenInvalid => "Token is invalid",
            ApiError::TokenExpired => "Token has expired",
            ApiError::NotFound(msg) => msg,
            ApiError::RouteNotFound => "Route not found",
            ApiError::UserAlreadyExists => "Email or username is already registered",
            ApiError::PayloadTooLarge => "Request body is too large",
            ApiError::Internal => INTERNAL_MESSAGE,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "status": "error",
            "statusCode": self.status_code().as_u16(),
            "message": self.message(),
        });

        if let ApiError::Validation { details, .. } = self {
            body["details"] = json!(details);
        }

        body
    }
}

impl ApiError {
    pub fn validation(result: ValidationResult) -> Self {
        ApiError::Validation {
            message: "Validation failed".to_string(),
            details: result.errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        ApiError::InvalidQuery(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Conflict(_) => ApiError::UserAlreadyExists,
            DatabaseError::QueryError(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database query error: {}", msg);
                ApiError::Internal
            }
            DatabaseError::Sqlx(sqlx_err) => {
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::Internal
            }
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Missing => ApiError::TokenMissing,
            JwtError::Expired => ApiError::TokenExpired,
            JwtError::Invalid => ApiError::TokenInvalid,
            JwtError::TokenGeneration(msg) => {
                tracing::error!("Token generation failed: {}", msg);
                ApiError::Internal
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserAlreadyExists => ApiError::UserAlreadyExists,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::Token(e) => e.into(),
            AuthError::Database(e) => e.into(),
            other => {
                tracing::error!("Auth service failure: {}", other);
                ApiError::Internal
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
