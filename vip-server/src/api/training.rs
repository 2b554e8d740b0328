//! Training roster endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use vip_common::model::TrainingRecord;
use vip_common::training;

use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct AttendanceRequest {
    pub completed: bool,
}

/// GET /api/admin/training
pub async fn progress(State(state): State<AppState>) -> ApiResult<Json<Vec<TrainingRecord>>> {
    Ok(Json(training::get_progress(&state.db).await?))
}

/// PUT /api/admin/training/:volunteer_id/:class_number
pub async fn set_attendance(
    State(state): State<AppState>,
    Path((volunteer_id, class_number)): Path<(Uuid, u32)>,
    Json(req): Json<AttendanceRequest>,
) -> ApiResult<StatusCode> {
    training::set_attendance(&state.db, volunteer_id, class_number, req.completed).await?;
    Ok(StatusCode::NO_CONTENT)
}
