//! Staff identity middleware
//!
//! The identity provider in front of this service authenticates the user and
//! forwards their email in `x-authenticated-email`. The middleware turns that
//! into a [`Staff`] request extension or rejects the request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use vip_common::auth::{Identity, Role};

use crate::{ApiError, AppState};

/// Header carrying the signed-in user's email
pub const IDENTITY_HEADER: &str = "x-authenticated-email";

/// Signed-in staff member, available to handlers as an extension
#[derive(Debug, Clone)]
pub struct Staff {
    pub identity: Identity,
    pub role: Role,
}

/// Resolve the caller's role
///
/// 401 without an identity, 403 when the identity has no role.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let email = request
        .headers()
        .get(IDENTITY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    let identity = Identity::new(email);
    let role = state.roles.resolve_role(&identity).ok_or_else(|| {
        warn!(email = %identity.email, "Access denied: no role assigned");
        ApiError::Forbidden("no role assigned".to_string())
    })?;

    debug!(email = %identity.email, role = role.as_str(), "Staff request");
    request.extensions_mut().insert(Staff { identity, role });

    Ok(next.run(request).await)
}

/// Allow only roles that may change configuration
///
/// Must run inside `auth_middleware`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let staff = request
        .extensions()
        .get::<Staff>()
        .ok_or(ApiError::Unauthorized)?;

    if !staff.role.can_configure() {
        warn!(email = %staff.identity.email, "Configuration access denied");
        return Err(ApiError::Forbidden(
            "configuration requires the admin role".to_string(),
        ));
    }

    Ok(next.run(request).await)
}
