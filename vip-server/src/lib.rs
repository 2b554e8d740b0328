//! vip-server library - Volunteer Intake Portal HTTP service
//!
//! Public intake endpoints for the registration wizard and a protected admin
//! area for reviewing applications. Identity comes from the upstream identity
//! provider; roles come from the staff allow-list.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use vip_common::auth::RoleResolver;
use vip_common::settings::SettingsService;

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub roles: Arc<dyn RoleResolver>,
    pub settings: SettingsService,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        roles: Arc<dyn RoleResolver>,
        settings: SettingsService,
        request_timeout: Duration,
    ) -> Self {
        Self {
            db,
            roles,
            settings,
            request_timeout,
        }
    }
}

/// Build application router
///
/// Admin routes pass through the identity middleware; configuration routes
/// additionally require the admin role.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};
    use tower_http::cors::CorsLayer;
    use tower_http::timeout::TimeoutLayer;
    use tower_http::trace::TraceLayer;

    let configuration = Router::new()
        .route(
            "/api/admin/ministries",
            get(api::ministries::list_all).post(api::ministries::add),
        )
        .route(
            "/api/admin/ministries/:name",
            put(api::ministries::rename).delete(api::ministries::remove),
        )
        .route(
            "/api/admin/settings",
            axum::routing::patch(api::settings::update_settings),
        )
        .route_layer(middleware::from_fn(api::auth::require_admin));

    let protected = Router::new()
        .route("/api/admin/volunteers", get(api::volunteers::list))
        .route(
            "/api/admin/volunteers/:id",
            axum::routing::delete(api::volunteers::delete),
        )
        .route("/api/admin/volunteers/:id/approve", post(api::volunteers::approve))
        .route("/api/admin/volunteers/:id/reject", post(api::volunteers::reject))
        .route("/api/admin/volunteers/:id/status", put(api::volunteers::set_status))
        .route("/api/admin/dashboard", get(api::dashboard::stats))
        .route("/api/admin/export.csv", get(api::volunteers::export_csv))
        .route("/api/admin/training", get(api::training::progress))
        .route(
            "/api/admin/training/:volunteer_id/:class_number",
            put(api::training::set_attendance),
        )
        .merge(configuration)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::auth_middleware,
        ));

    let public = Router::new()
        .route("/api/settings", get(api::settings::get_settings))
        .route("/api/ministries", get(api::ministries::list_active))
        .route("/api/wizard/next", post(api::wizard::next))
        .route("/api/wizard/back", post(api::wizard::back))
        .route("/api/registrations", post(api::registration::submit))
        .merge(api::health::health_routes());

    let timeout = state.request_timeout;

    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
