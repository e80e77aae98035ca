use axum::extract::State;
use axum::Extension;
use chrono::Utc;
use serde::Serialize;

use super::TodoRequest;
use crate::api::{ApiJson, ApiQuery, TodoView};
use crate::error::ApiError;
use crate::filter::{ListParams, TodoQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validators::validate_create_todo;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllResult {
    pub deleted_count: u64,
}

/// POST /api/todos - create a todo owned by the caller
pub async fn todos_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<TodoRequest>,
) -> ApiResult<TodoView> {
    let result = validate_create_todo(&body.fields(), Utc::now());
    if !result.is_valid() {
        tracing::warn!("Create todo validation failed for user {}: {:?}", user.user_id, result.errors);
        return Err(ApiError::validation(result));
    }

    let todo = state.todos.create(&user.user_id, body.into_new_todo()).await?;
    tracing::info!("Todo {} created by user {}", todo.id, user.user_id);

    Ok(ApiResponse::created(TodoView::from(todo), "Todo created successfully"))
}

/// GET /api/todos - filtered, sorted, paginated list of the caller's todos
pub async fn todos_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Vec<TodoView>> {
    let query = TodoQuery::from_params(&params);
    let page = state.todos.list(&user.user_id, &query).await?;
    tracing::info!("Listed {} of {} todos for user {}", page.items.len(), page.total, user.user_id);

    let now = Utc::now();
    let items = page.items.into_iter().map(|t| TodoView::at(t, now)).collect();

    Ok(ApiResponse::paginated(
        items,
        "Todos retrieved successfully",
        query.pagination(page.total),
    ))
}

/// DELETE /api/todos - remove every todo the caller owns
pub async fn todos_delete_all(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<DeleteAllResult> {
    let deleted_count = state.todos.delete_all(&user.user_id).await?;
    tracing::info!("Deleted {} todos for user {}", deleted_count, user.user_id);

    Ok(ApiResponse::success(
        DeleteAllResult { deleted_count },
        "All todos deleted successfully",
    ))
}
