//! Registration submission

use axum::{extract::State, http::StatusCode, Json};
use vip_common::registration::{process_registration, RegisteredApplication};
use vip_common::IntakeAnswers;

use crate::{ApiResult, AppState};

/// POST /api/registrations
///
/// Classifies and stores a completed wizard. 201 with the stored
/// application, 409 while registration is closed.
pub async fn submit(
    State(state): State<AppState>,
    Json(answers): Json<IntakeAnswers>,
) -> ApiResult<(StatusCode, Json<RegisteredApplication>)> {
    let registered = process_registration(&state.db, &answers).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}
