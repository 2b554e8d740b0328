//! Dashboard statistics

use axum::{extract::State, Json};
use vip_common::dashboard::DashboardStats;
use vip_common::review;

use crate::{ApiResult, AppState};

/// GET /api/admin/dashboard
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    let applications = review::list_applications(&state.db).await?;
    Ok(Json(DashboardStats::compute(&applications)))
}
