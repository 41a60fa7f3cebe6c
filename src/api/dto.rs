use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{alerts::Alert, firebase::models::SensorReading, preferences::Theme};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AlertsDto {
    pub count: usize,
    /// Newest first.
    pub alerts: Vec<Alert>,
}

/// One row of the recent-history table. Zero readings are shown as absent,
/// matching the dashboard's `--` placeholders.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryRowDto {
    pub observed_at: DateTime<Utc>,
    pub soil: Option<f64>,
    pub humidity: Option<f64>,
    pub air_temp: Option<f64>,
    pub ph: Option<f64>,
    pub water_level: Option<f64>,
}

fn non_zero(v: f64) -> Option<f64> {
    (v != 0.0).then_some(v)
}

impl From<SensorReading> for HistoryRowDto {
    fn from(r: SensorReading) -> Self {
        Self {
            observed_at: r.observed_at,
            soil: non_zero(r.soil),
            humidity: non_zero(r.humidity),
            air_temp: non_zero(r.air_temp),
            ph: non_zero(r.ph),
            water_level: non_zero(r.water_level),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThemeDto {
    pub theme: Theme,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthDto {
    pub status: String,
}
