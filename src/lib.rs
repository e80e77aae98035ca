use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod validators;

#[cfg(test)]
pub mod testing;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Build the complete HTTP application around `state`.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes())
        .merge(todo_routes(state.clone()))
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::public::{auth, health};

    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/auth/register", post(auth::register_post))
        .route("/api/auth/login", post(auth::login_post))
}

fn todo_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::todos;

    Router::new()
        .route(
            "/api/todos",
            get(todos::todos_list)
                .post(todos::todos_create)
                .delete(todos::todos_delete_all),
        )
        .route(
            "/api/todos/:id",
            get(todos::todo_get)
                .put(todos::todo_update)
                .delete(todos::todo_delete),
        )
        // route_layer: unmatched paths fall through to the 404 fallback
        // instead of answering 401
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            crate::middleware::jwt_auth_middleware,
        ))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| HeaderValue::from_str(o).ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}
