//! App settings endpoints

use axum::{extract::State, Json};
use vip_common::settings::{AppSettings, SettingsUpdate};

use crate::{ApiResult, AppState};

/// GET /api/settings
///
/// Served from the local copy; never waits on the database.
pub async fn get_settings(State(state): State<AppState>) -> Json<AppSettings> {
    Json(state.settings.current())
}

/// PATCH /api/admin/settings
pub async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<Json<AppSettings>> {
    Ok(Json(state.settings.update(&update).await?))
}
