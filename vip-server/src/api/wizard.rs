//! Wizard navigation endpoints
//!
//! Stateless: the browser sends the current step and form, the server answers
//! with where to go next. Nothing is stored until the registration is posted.

use axum::Json;
use serde::{Deserialize, Serialize};
use vip_common::navigator::{self, Step, Transition, WizardForm};
use vip_common::Error;

use crate::ApiResult;

#[derive(Debug, Deserialize)]
pub struct NavigationRequest {
    pub step: Step,
    #[serde(default)]
    pub form: WizardForm,
}

#[derive(Debug, Serialize)]
pub struct BackResponse {
    pub step: Step,
}

/// POST /api/wizard/next
///
/// 422 with field messages when the current step is incomplete.
pub async fn next(Json(req): Json<NavigationRequest>) -> ApiResult<Json<Transition>> {
    let transition = navigator::next(req.step, &req.form).map_err(Error::Validation)?;
    Ok(Json(transition))
}

/// POST /api/wizard/back
pub async fn back(Json(req): Json<NavigationRequest>) -> Json<BackResponse> {
    Json(BackResponse {
        step: navigator::back(req.step, &req.form),
    })
}
