//! Ministry tag endpoints
//!
//! `list_active` is public (the wizard's options); the rest are admin-only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use vip_common::ministry::{self, AddOutcome, RemovalMode};
use vip_common::model::MinistryTag;

use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoveQuery {
    #[serde(default)]
    pub mode: RemovalMode,
}

#[derive(Debug, Serialize)]
pub struct AddResponse {
    pub name: String,
    pub outcome: &'static str,
}

/// GET /api/ministries
pub async fn list_active(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(ministry::list_active(&state.db).await?))
}

/// GET /api/admin/ministries
pub async fn list_all(State(state): State<AppState>) -> ApiResult<Json<Vec<MinistryTag>>> {
    Ok(Json(ministry::list_all(&state.db).await?))
}

/// POST /api/admin/ministries
///
/// 201 when created, 200 when reactivated or already active.
pub async fn add(
    State(state): State<AppState>,
    Json(req): Json<NameRequest>,
) -> ApiResult<(StatusCode, Json<AddResponse>)> {
    let mut conn = state.db.acquire().await.map_err(vip_common::Error::from)?;
    let outcome = ministry::add(&mut conn, &req.name).await?;

    let (status, label) = match outcome {
        AddOutcome::Created => (StatusCode::CREATED, "created"),
        AddOutcome::Reactivated => (StatusCode::OK, "reactivated"),
        AddOutcome::AlreadyActive => (StatusCode::OK, "already_active"),
    };

    Ok((
        status,
        Json(AddResponse {
            name: req.name.trim().to_string(),
            outcome: label,
        }),
    ))
}

/// DELETE /api/admin/ministries/:name?mode=hard|soft
pub async fn remove(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<RemoveQuery>,
) -> ApiResult<StatusCode> {
    ministry::remove(&state.db, &name, query.mode).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/admin/ministries/:name
pub async fn rename(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<NameRequest>,
) -> ApiResult<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(vip_common::Error::from)?;
    ministry::rename(&mut conn, &name, &req.name).await?;
    Ok(StatusCode::NO_CONTENT)
}
