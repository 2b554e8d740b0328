//! Application review endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use vip_common::dashboard::{contact_message, filter_applications};
use vip_common::export::applications_csv;
use vip_common::model::{ApplicationRecord, PipelineStatus};
use vip_common::review;

use crate::api::Staff;
use crate::{ApiResult, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filter: String,
}

/// One row of the admin list
#[derive(Debug, Serialize)]
pub struct VolunteerView {
    #[serde(flatten)]
    pub application: ApplicationRecord,
    /// Canned message to send the applicant for their status
    pub contact_message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub id: Uuid,
    pub status: PipelineStatus,
}

/// GET /api/admin/volunteers?filter=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<VolunteerView>>> {
    let applications = review::list_applications(&state.db).await?;

    let views = filter_applications(&applications, &query.filter)
        .into_iter()
        .map(|app| VolunteerView {
            contact_message: contact_message(&app.status),
            application: app.clone(),
        })
        .collect();

    Ok(Json(views))
}

/// POST /api/admin/volunteers/:id/approve
pub async fn approve(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StatusResponse>> {
    review::approve(&state.db, id).await?;
    info!(volunteer_id = %id, by = %staff.identity.email, "Approved");
    Ok(Json(StatusResponse {
        id,
        status: PipelineStatus::Approved,
    }))
}

/// POST /api/admin/volunteers/:id/reject
pub async fn reject(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StatusResponse>> {
    review::reject(&state.db, id).await?;
    info!(volunteer_id = %id, by = %staff.identity.email, "Rejected");
    Ok(Json(StatusResponse {
        id,
        status: PipelineStatus::Rejected,
    }))
}

/// PUT /api/admin/volunteers/:id/status
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let status = review::set_status(&state.db, id, &req.status, &req.note).await?;
    Ok(Json(StatusResponse { id, status }))
}

/// DELETE /api/admin/volunteers/:id
///
/// 204 on success, 403 DELETE_DENIED when nothing was deleted.
pub async fn delete(
    State(state): State<AppState>,
    Extension(staff): Extension<Staff>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    review::delete_volunteer(&state.db, id).await?;
    info!(volunteer_id = %id, by = %staff.identity.email, "Deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/export.csv?filter=
pub async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let applications = review::list_applications(&state.db).await?;
    let filtered = filter_applications(&applications, &query.filter);
    let csv = applications_csv(filtered)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"volunteers.csv\"",
            ),
        ],
        csv,
    ))
}
