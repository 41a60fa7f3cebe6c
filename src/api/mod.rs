pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{
    routing::{delete, get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use handlers::ApiDoc;

use crate::{
    dashboard::DashboardHandle, poller::Poller, preferences::PreferenceStore, pump::PumpController,
};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dashboard: DashboardHandle,
    pub poller: Poller,
    pub pump: PumpController,
    pub preferences: PreferenceStore,
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/refresh", post(handlers::refresh))
        .route("/pump/{command}", post(handlers::pump_command))
        .route(
            "/alerts",
            get(handlers::get_alerts).delete(handlers::clear_alerts),
        )
        .route("/alerts/{id}", delete(handlers::delete_alert))
        .route(
            "/alerts/air-quality/dismiss",
            post(handlers::dismiss_air_quality),
        )
        .route("/history", get(handlers::get_history))
        .route("/history/export.csv", get(handlers::export_history))
        .route("/preferences/theme", get(handlers::get_theme))
        .route("/preferences/theme/toggle", post(handlers::toggle_theme))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
