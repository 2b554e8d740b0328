//! HTTP error type for vip-server
//!
//! Every failure leaves the server as `{"error": {"code", "message"}}`, with
//! a `fields` map added for validation errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::error;
use vip_common::Error as CommonError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// No identity header (401)
    #[error("Sign-in required")]
    Unauthorized,

    /// Identity known but not allowed (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// vip-common error
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Common(err) => match err {
                CommonError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED"),
                CommonError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                CommonError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                CommonError::DeleteDenied(_) => (StatusCode::FORBIDDEN, "DELETE_DENIED"),
                CommonError::RegistrationClosed => (StatusCode::CONFLICT, "REGISTRATION_CLOSED"),
                CommonError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
                CommonError::Database(_) | CommonError::Io(_) | CommonError::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();

        // Store failures are logged with detail and reported generically
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
            "The operation could not be completed".to_string()
        } else {
            self.to_string()
        };

        let mut body = Map::new();
        body.insert("code".to_string(), json!(code));
        body.insert("message".to_string(), json!(message));

        if let ApiError::Common(CommonError::Validation(fields)) = &self {
            let fields: Map<String, Value> = fields
                .iter()
                .map(|(field, msg)| (field.to_string(), json!(msg)))
                .collect();
            body.insert("fields".to_string(), Value::Object(fields));
        }

        (status, Json(json!({ "error": body }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
