// handlers/public/auth/login.rs - POST /api/auth/login
use axum::extract::State;

use super::LoginRequest;
use crate::api::ApiJson;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LoginResponse;
use crate::state::AppState;
use crate::validators::validate_login;

/// Authenticate and receive a JWT.
///
/// Input: `{ email, password }`
///
/// Output: `{ token, user: { id, username, email } }`. An unknown email and
/// a wrong password produce the same 401.
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let result = validate_login(body.email.as_deref(), body.password.as_deref());
    if !result.is_valid() {
        tracing::warn!("Login validation failed: {:?}", result.errors);
        return Err(ApiError::validation(result));
    }

    let response = state
        .auth
        .login(
            body.email.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(ApiResponse::success(response, "Login successful"))
}
