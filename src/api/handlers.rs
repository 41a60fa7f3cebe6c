use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use utoipa::OpenApi;
use uuid::Uuid;

use super::{
    dto::{AlertsDto, HealthDto, HistoryRowDto, ThemeDto},
    errors::AppError,
    AppState,
};
use crate::{
    alerts::{Alert, AlertKind},
    dashboard::DashboardSnapshot,
    pump::PumpCommand,
};

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is running", body = HealthDto)),
    tag = "dashboard"
)]
pub async fn health() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_owned(),
    })
}

/// Everything the dashboard currently displays.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses((status = 200, description = "Dashboard snapshot", body = DashboardSnapshot)),
    tag = "dashboard"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.dashboard.snapshot().await)
}

/// Fetch every source now, independent of the polling timer. Returns as
/// soon as the requests are started.
#[utoipa::path(
    post,
    path = "/refresh",
    responses((status = 202, description = "Refresh started")),
    tag = "dashboard"
)]
pub async fn refresh(State(state): State<AppState>) -> StatusCode {
    let _ = state.poller.refresh_all();
    state
        .dashboard
        .update(|d| {
            d.push_alert(AlertKind::Info, "Data Refresh", "All data refreshed successfully")
        })
        .await;
    StatusCode::ACCEPTED
}

// ---------------------------------------------------------------------------
// Pump
// ---------------------------------------------------------------------------

/// `start` / `stop` switch the pump under manual override, `auto` hands
/// control back to the automatic controller.
#[utoipa::path(
    post,
    path = "/pump/{command}",
    params(("command" = PumpCommand, Path, description = "start | stop | auto")),
    responses(
        (status = 204, description = "Command accepted by the database"),
        (status = 502, description = "Database rejected or did not answer"),
    ),
    tag = "pump"
)]
pub async fn pump_command(
    State(state): State<AppState>,
    Path(command): Path<PumpCommand>,
) -> Result<StatusCode, AppError> {
    state.pump.send(command).await?;

    let poller = state.poller.clone();
    tokio::spawn(async move { poller.refresh_controls().await });

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/alerts",
    responses((status = 200, description = "Alert feed, newest first", body = AlertsDto)),
    tag = "alerts"
)]
pub async fn get_alerts(State(state): State<AppState>) -> Json<AlertsDto> {
    let alerts = state.dashboard.read(|d| d.alerts()).await;
    Json(AlertsDto {
        count: alerts.len(),
        alerts,
    })
}

#[utoipa::path(
    delete,
    path = "/alerts",
    responses((status = 204, description = "All alerts removed")),
    tag = "alerts"
)]
pub async fn clear_alerts(State(state): State<AppState>) -> StatusCode {
    state.dashboard.update(|d| d.clear_alerts()).await;
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    delete,
    path = "/alerts/{id}",
    params(("id" = Uuid, Path, description = "Alert ID")),
    responses(
        (status = 204, description = "Alert removed"),
        (status = 404, description = "No such alert"),
    ),
    tag = "alerts"
)]
pub async fn delete_alert(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.dashboard.update(|d| d.remove_alert(id)).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Acknowledge the air-quality popup. The same status will not pop up again
/// until the air quality moves to a different status.
#[utoipa::path(
    post,
    path = "/alerts/air-quality/dismiss",
    responses((status = 204, description = "Popup dismissed")),
    tag = "alerts"
)]
pub async fn dismiss_air_quality(State(state): State<AppState>) -> StatusCode {
    state.dashboard.update(|d| d.dismiss_air_quality()).await;
    StatusCode::NO_CONTENT
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/history",
    responses((status = 200, description = "Up to 20 most recent readings, newest first", body = Vec<HistoryRowDto>)),
    tag = "history"
)]
pub async fn get_history(State(state): State<AppState>) -> Json<Vec<HistoryRowDto>> {
    let rows = state.dashboard.read(|d| d.recent_history()).await;
    Json(rows.into_iter().map(Into::into).collect())
}

#[utoipa::path(
    get,
    path = "/history/export.csv",
    responses((status = 200, description = "Stored readings as CSV", body = String, content_type = "text/csv")),
    tag = "history"
)]
pub async fn export_history(State(state): State<AppState>) -> impl IntoResponse {
    let csv = state
        .dashboard
        .update(|d| {
            d.push_alert(AlertKind::Success, "Data Export", "Data exported successfully");
            d.history().to_csv()
        })
        .await;

    let disposition = format!(
        "attachment; filename=\"aquaclima_data_{}.csv\"",
        Utc::now().format("%Y-%m-%d")
    );

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/preferences/theme",
    responses((status = 200, description = "Current theme", body = ThemeDto)),
    tag = "preferences"
)]
pub async fn get_theme(State(state): State<AppState>) -> Json<ThemeDto> {
    Json(ThemeDto {
        theme: state.dashboard.read(|d| d.theme()).await,
    })
}

#[utoipa::path(
    post,
    path = "/preferences/theme/toggle",
    responses((status = 200, description = "Theme after toggling", body = ThemeDto)),
    tag = "preferences"
)]
pub async fn toggle_theme(State(state): State<AppState>) -> Json<ThemeDto> {
    // Flip and persist under one writer so the file tracks memory.
    let writer = state.preferences.lock().await;
    let theme = state
        .dashboard
        .update(|d| {
            let next = d.theme().toggled();
            d.set_theme(next);
            next
        })
        .await;
    writer.set_theme(theme).await;
    Json(ThemeDto { theme })
}

// ---------------------------------------------------------------------------
// OpenAPI spec struct (used in api/mod.rs)
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        get_dashboard,
        refresh,
        pump_command,
        get_alerts,
        clear_alerts,
        delete_alert,
        dismiss_air_quality,
        get_history,
        export_history,
        get_theme,
        toggle_theme,
    ),
    components(schemas(DashboardSnapshot, AlertsDto, Alert, HistoryRowDto, ThemeDto, HealthDto, PumpCommand)),
    tags(
        (name = "dashboard", description = "Live dashboard state"),
        (name = "pump", description = "Pump manual override"),
        (name = "alerts", description = "Alert feed"),
        (name = "history", description = "Recent readings and CSV export"),
        (name = "preferences", description = "Persisted display preferences"),
    ),
    info(
        title = "AquaClima Monitor API",
        version = "0.1.0",
        description = "Irrigation sensor dashboard backed by a Firebase realtime database"
    )
)]
pub struct ApiDoc;
