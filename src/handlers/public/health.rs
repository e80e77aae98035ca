use axum::extract::State;
use chrono::Utc;
use serde::Serialize;

use crate::api::format::format_timestamp;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    /// Seconds since the router state was built.
    pub uptime: f64,
    pub timestamp: String,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> ApiResult<HealthStatus> {
    Ok(ApiResponse::success(
        HealthStatus {
            status: "healthy",
            uptime: state.started_at.elapsed().as_secs_f64(),
            timestamp: format_timestamp(&Utc::now()),
        },
        "Server is running",
    ))
}
