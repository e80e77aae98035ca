use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::Claims;
use crate::database::ObjectId;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller extracted from a verified bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: ObjectId,
    pub email: String,
    pub username: String,
}

impl TryFrom<Claims> for AuthUser {
    type Error = ApiError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = ObjectId::parse(&claims.user_id).map_err(|_| ApiError::TokenInvalid)?;
        Ok(Self {
            user_id,
            email: claims.email,
            username: claims.username,
        })
    }
}

/// JWT authentication middleware that validates tokens and injects [`AuthUser`]
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;

    let claims = state.auth.verify_token(token).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        ApiError::from(e)
    })?;

    let auth_user = AuthUser::try_from(claims)?;
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// `Ok(None)` when there is no usable token; a header with some other scheme
/// is invalid rather than missing.
fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header.to_str().map_err(|_| ApiError::TokenInvalid)?.trim();
    if auth_str.is_empty() {
        return Ok(None);
    }

    match auth_str.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("Bearer") => Ok(Some(token.trim())),
        None if auth_str.eq_ignore_ascii_case("Bearer") => Ok(None),
        _ => Err(ApiError::TokenInvalid),
    }
}
