use axum::extract::State;
use axum::Extension;

use super::TodoRequest;
use crate::api::{parse_todo_id, ApiJson, ApiPath, TodoView};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validators::validate_update_todo;

/// GET /api/todos/:id
pub async fn todo_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<TodoView> {
    let id = parse_todo_id(&id)?;
    let todo = state.todos.find(&user.user_id, &id).await?;

    Ok(ApiResponse::success(TodoView::from(todo), "Todo retrieved successfully"))
}

/// PUT /api/todos/:id - partial update; absent fields are left untouched
pub async fn todo_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<TodoRequest>,
) -> ApiResult<TodoView> {
    let id = parse_todo_id(&id)?;

    let result = validate_update_todo(&body.fields());
    if !result.is_valid() {
        tracing::warn!("Update todo {} validation failed: {:?}", id, result.errors);
        return Err(ApiError::validation(result));
    }

    let todo = state.todos.update(&user.user_id, &id, body.into_patch()).await?;
    tracing::info!("Todo {} updated by user {}", id, user.user_id);

    Ok(ApiResponse::success(TodoView::from(todo), "Todo updated successfully"))
}

/// DELETE /api/todos/:id
pub async fn todo_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<()> {
    let id = parse_todo_id(&id)?;
    state.todos.delete(&user.user_id, &id).await?;
    tracing::info!("Todo {} deleted by user {}", id, user.user_id);

    Ok(ApiResponse::success((), "Todo deleted successfully"))
}
