//! Admin dashboard statistics endpoint.
//!
//! GET /api/v1/admin/stats - Aggregate usage counters.

use std::time::Instant;

use axum::Json;
use axum::extract::State;

use tutoria_core::stats::repository::StatsRepository;
use tutoria_types::stats::DashboardStats;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/admin/stats - Aggregate dashboard statistics.
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let stats = state.stats_repo.dashboard_stats().await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(stats, request_id, elapsed)
        .with_link("self", "/api/v1/admin/stats");

    Ok(Json(resp))
}
