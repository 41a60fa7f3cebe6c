//! Display models derived from a single [`SensorReading`].
//!
//! Everything here is a pure function of the reading: rendering the same
//! reading twice yields the same panel.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    firebase::models::SensorReading,
    status::{self, Severity, StatusResult},
};

/// Circumference of the soil/humidity progress rings (2 * pi * 35, rounded).
const RING_CIRCUMFERENCE: f64 = 220.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn against(current: f64, baseline: f64) -> Self {
        if current > baseline {
            Trend::Up
        } else if current < baseline {
            Trend::Down
        } else {
            Trend::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Metric {
    /// Formatted value with unit, e.g. `"45%"`.
    pub text: String,
    pub trend: Trend,
    /// Present for sensors with a status badge.
    pub status: Option<StatusResult>,
    /// Gauge fill in percent, present for sensors with a gauge.
    pub fill: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatteryPanel {
    pub text: String,
    /// Bar width in percent, never below 5 so the bar stays visible.
    pub level: f64,
    pub severity: Severity,
    /// Estimated remaining runtime, e.g. `"12h 0m"`.
    pub remaining: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SensorPanel {
    pub soil: Metric,
    /// Stroke offset of the soil progress ring.
    pub soil_ring_offset: f64,
    pub humidity: Metric,
    pub humidity_ring_offset: f64,
    pub water_level: Metric,
    pub ph: Metric,
    pub air_temp: Metric,
    pub water_temp: Metric,
    pub air_quality: Metric,
    pub flow: Metric,
    pub battery: BatteryPanel,
}

impl SensorPanel {
    pub fn render(r: &SensorReading) -> Self {
        Self {
            soil: Metric {
                text: format!("{}%", r.soil),
                trend: Trend::against(r.soil, 50.0),
                status: None,
                fill: None,
            },
            soil_ring_offset: ring_offset(r.soil, 100.0),
            humidity: Metric {
                text: format!("{}%", r.humidity),
                trend: Trend::against(r.humidity, 60.0),
                status: None,
                fill: None,
            },
            humidity_ring_offset: ring_offset(r.humidity, 100.0),
            water_level: Metric {
                text: format!("{}%", r.water_level),
                trend: Trend::against(r.water_level, 50.0),
                status: Some(status::water_level_table().evaluate(r.water_level)),
                fill: Some(r.water_level.max(2.0)),
            },
            ph: Metric {
                text: format!("{:.1}", r.ph),
                trend: Trend::against(r.ph, 7.0),
                status: Some(status::ph_table().evaluate(r.ph)),
                fill: Some(percent_of(r.ph, 14.0)),
            },
            air_temp: Metric {
                text: format!("{}°C", r.air_temp),
                trend: Trend::against(r.air_temp, 25.0),
                status: None,
                fill: Some(percent_of(r.air_temp, 50.0)),
            },
            water_temp: Metric {
                text: format!("{}°C", r.water_temp),
                trend: Trend::against(r.water_temp, 22.0),
                status: Some(status::water_temp_table().evaluate(r.water_temp)),
                fill: None,
            },
            air_quality: Metric {
                text: format!("{} AQI", r.air_quality),
                trend: Trend::against(r.air_quality, 75.0),
                status: Some(status::air_quality_table().evaluate(r.air_quality)),
                fill: Some(percent_of(r.air_quality, 200.0)),
            },
            flow: Metric {
                text: format!("{} L/min", r.flow),
                trend: Trend::against(r.flow, 3.0),
                status: Some(status::flow_table().evaluate(r.flow)),
                fill: None,
            },
            battery: BatteryPanel::render(r.battery),
        }
    }
}

impl BatteryPanel {
    fn render(pct: f64) -> Self {
        let severity = if pct > 50.0 {
            Severity::Good
        } else if pct > 20.0 {
            Severity::Warning
        } else {
            Severity::Danger
        };

        // A full charge lasts roughly a day.
        let hours_left = pct / 100.0 * 24.0;
        let hours = hours_left.floor();
        let minutes = ((hours_left - hours) * 60.0).floor();

        Self {
            text: format!("{pct}%"),
            level: pct.max(5.0),
            severity,
            remaining: format!("{}h {}m", hours as i64, minutes as i64),
        }
    }
}

/// `value / max` as a percentage clamped to `0..=100`.
fn percent_of(value: f64, max: f64) -> f64 {
    (value / max * 100.0).clamp(0.0, 100.0)
}

fn ring_offset(value: f64, max: f64) -> f64 {
    RING_CIRCUMFERENCE - percent_of(value, max) / 100.0 * RING_CIRCUMFERENCE
}

/// Format a duration in whole milliseconds as `"{h}h {m}m"`.
pub fn hours_minutes(millis: i64) -> String {
    let millis = millis.max(0);
    let hours = millis / 3_600_000;
    let minutes = (millis % 3_600_000) / 60_000;
    format!("{hours}h {minutes}m")
}
