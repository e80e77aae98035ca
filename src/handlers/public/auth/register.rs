// handlers/public/auth/register.rs - POST /api/auth/register
use axum::extract::State;

use super::RegisterRequest;
use crate::api::ApiJson;
use crate::database::models::PublicUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validators::validate_register;

/// Register a new account.
///
/// Input: `{ username, email, password, confirmPassword }`
///
/// 201 with `{ id, username, email }`, 400 with every validation message, or
/// 409 when the email or username is taken.
pub async fn register_post(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<PublicUser> {
    let result = validate_register(
        body.username.as_deref(),
        body.email.as_deref(),
        body.password.as_deref(),
        body.confirm_password.as_deref(),
    );
    if !result.is_valid() {
        tracing::warn!("Registration validation failed: {:?}", result.errors);
        return Err(ApiError::validation(result));
    }

    let user = state
        .auth
        .register(
            body.username.as_deref().unwrap_or_default(),
            body.email.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(ApiResponse::created(user, "User registered successfully"))
}
