use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::{request::Parts, StatusCode},
    Json,
};

use crate::database::ObjectId;
use crate::error::ApiError;

/// `Json` extractor whose rejections use the error envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                tracing::warn!("Rejected request body: {}", rejection.body_text());
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    Err(ApiError::PayloadTooLarge)
                } else {
                    Err(ApiError::invalid_json(rejection.body_text()))
                }
            }
        }
    }
}

/// `Query` extractor; a query string that does not deserialize is a 400
/// envelope instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => {
                tracing::warn!("Rejected query string: {}", rejection.body_text());
                Err(ApiError::invalid_query(rejection.body_text()))
            }
        }
    }
}

/// `Path` extractor. The only path parameter is a todo id, so any rejection
/// is reported as `InvalidId`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => {
                tracing::warn!("Rejected path parameters: {}", rejection.body_text());
                Err(ApiError::InvalidId)
            }
        }
    }
}

/// Parse a path id, failing with `InvalidId` before any store lookup.
pub fn parse_todo_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse(raw.trim()).map_err(|_| ApiError::InvalidId)
}
