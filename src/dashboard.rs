use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    alerts::{Alert, AlertChannels, AlertFeed, AlertKind, ChannelState},
    firebase::models::{PumpControlState, SensorReading},
    history::{History, TABLE_ROWS},
    panels::{hours_minutes, SensorPanel},
    preferences::Theme,
    status::AIR_QUALITY_HAZARDOUS,
    weather::models::WeatherView,
};

pub const AIR_QUALITY_CHANNEL: &str = "air_quality";

const NO_RECOMMENDATION: &str = "No recommendations available";
const RECOMMENDATION_UNAVAILABLE: &str = "Unable to load recommendations";

// ---------------------------------------------------------------------------
// Snapshot types (what the API serves)
// ---------------------------------------------------------------------------

/// Freshness of one upstream data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SourceStatus {
    pub online: bool,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SourceStatus {
    fn succeeded(&mut self, at: DateTime<Utc>) {
        self.online = true;
        self.last_success = Some(at);
        self.last_error = None;
    }

    fn failed(&mut self, error: &str) {
        self.online = false;
        self.last_error = Some(error.to_owned());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Sources {
    pub sensors: SourceStatus,
    pub controls: SourceStatus,
    pub recommendation: SourceStatus,
    pub weather: SourceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PumpPanel {
    /// `"Running"` or `"Stopped"`
    pub status: String,
    pub running: bool,
    /// `"Manual"` or `"Automatic"`
    pub mode: String,
    /// Time since the pump was last seen switching on, `"0h 0m"` when stopped.
    pub runtime: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Stats {
    /// Estimated litres pumped since startup. Only ever grows.
    pub water_used_litres: f64,
    pub water_used: String,
    pub total_runtime: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AirQualityPopup {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardSnapshot {
    pub theme: Theme,
    /// Connectivity indicator, follows the sensor source.
    pub online: bool,
    pub sources: Sources,
    pub reading: Option<SensorReading>,
    pub sensors: Option<SensorPanel>,
    pub pump: Option<PumpPanel>,
    pub recommendation: Option<String>,
    pub weather: Option<WeatherView>,
    pub stats: Stats,
    pub air_quality_popup: Option<AirQualityPopup>,
    pub alert_count: usize,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// All mutable dashboard state. Owned by a [`DashboardHandle`]; each poll
/// result touches only its own fields.
#[derive(Debug)]
pub struct Dashboard {
    theme: Theme,
    sources: Sources,
    reading: Option<SensorReading>,
    sensors: Option<SensorPanel>,
    controls: Option<PumpControlState>,
    pump_started_at: Option<DateTime<Utc>>,
    recommendation: Option<String>,
    weather: Option<WeatherView>,
    water_used_litres: f64,
    channels: AlertChannels,
    popup: Option<AirQualityPopup>,
    alerts: AlertFeed,
    history: History,
}

impl Dashboard {
    pub fn new(theme: Theme, history_capacity: usize) -> Self {
        let mut channels = AlertChannels::new();
        channels.register(AIR_QUALITY_CHANNEL, AIR_QUALITY_HAZARDOUS);

        Self {
            theme,
            sources: Sources::default(),
            reading: None,
            sensors: None,
            controls: None,
            pump_started_at: None,
            recommendation: None,
            weather: None,
            water_used_litres: 0.0,
            channels,
            popup: None,
            alerts: AlertFeed::new(),
            history: History::with_capacity(history_capacity),
        }
    }

    /// Apply a fresh sensor reading. Returns `true` when it raised an
    /// air-quality alert.
    pub fn apply_reading(&mut self, reading: SensorReading) -> bool {
        if let (Some(prev), Some(true)) = (&self.reading, self.controls.map(|c| c.pump)) {
            let minutes = (reading.observed_at - prev.observed_at).num_milliseconds().max(0) as f64
                / 60_000.0;
            self.water_used_litres += reading.flow.max(0.0) * minutes;
        }

        let panel = SensorPanel::render(&reading);
        let aqi_label = panel
            .air_quality
            .status
            .as_ref()
            .map(|s| s.label.clone())
            .unwrap_or_default();

        let alerted = self.channels.observe(AIR_QUALITY_CHANNEL, &aqi_label);
        let idle = self
            .channels
            .get(AIR_QUALITY_CHANNEL)
            .map_or(true, |c| c.state() == ChannelState::Idle);
        if idle {
            self.popup = None;
        }
        if alerted {
            self.popup = Some(AirQualityPopup {
                status: aqi_label.clone(),
                message: format!("Air Quality is {}! ({} AQI)", aqi_label, reading.air_quality),
            });
            self.alerts.push(
                AlertKind::Warning,
                "Air Quality Alert",
                &format!("Air quality is {} ({} AQI)", aqi_label, reading.air_quality),
            );
        }

        self.sources.sensors.succeeded(reading.observed_at);
        self.history.push(reading.clone());
        self.sensors = Some(panel);
        self.reading = Some(reading);
        alerted
    }

    pub fn sensors_failed(&mut self, error: &str) {
        self.sources.sensors.failed(error);
    }

    pub fn apply_controls(&mut self, controls: PumpControlState, at: DateTime<Utc>) {
        let was_running = self.controls.map(|c| c.pump).unwrap_or(false);
        if controls.pump && !was_running {
            self.pump_started_at = Some(at);
        } else if !controls.pump {
            self.pump_started_at = None;
        }
        self.controls = Some(controls);
        self.sources.controls.succeeded(at);
    }

    pub fn controls_failed(&mut self, error: &str) {
        self.sources.controls.failed(error);
    }

    pub fn apply_recommendation(&mut self, text: Option<String>, at: DateTime<Utc>) {
        self.recommendation = Some(text.unwrap_or_else(|| NO_RECOMMENDATION.to_owned()));
        self.sources.recommendation.succeeded(at);
    }

    pub fn recommendation_failed(&mut self, error: &str) {
        if self.recommendation.is_none() {
            self.recommendation = Some(RECOMMENDATION_UNAVAILABLE.to_owned());
        }
        self.sources.recommendation.failed(error);
    }

    pub fn apply_weather(&mut self, view: WeatherView, at: DateTime<Utc>) {
        self.weather = Some(view);
        self.sources.weather.succeeded(at);
    }

    pub fn weather_failed(&mut self, error: &str) {
        if self.weather.is_none() {
            self.weather = Some(WeatherView::unavailable());
        }
        self.sources.weather.failed(error);
    }

    /// Hide the air-quality popup and silence its label until it changes.
    pub fn dismiss_air_quality(&mut self) {
        self.popup = None;
        self.channels.dismiss(AIR_QUALITY_CHANNEL);
    }

    pub fn push_alert(&mut self, kind: AlertKind, title: &str, message: &str) -> Uuid {
        self.alerts.push(kind, title, message)
    }

    pub fn remove_alert(&mut self, id: Uuid) -> bool {
        self.alerts.remove(id).is_some()
    }

    pub fn clear_alerts(&mut self) {
        self.alerts.clear();
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.entries()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn recent_history(&self) -> Vec<SensorReading> {
        self.history.recent(TABLE_ROWS)
    }

    fn runtime(&self, now: DateTime<Utc>) -> String {
        match self.pump_started_at {
            Some(started) => hours_minutes((now - started).num_milliseconds()),
            None => hours_minutes(0),
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> DashboardSnapshot {
        let runtime = self.runtime(now);
        let pump = self.controls.map(|c| PumpPanel {
            status: (if c.pump { "Running" } else { "Stopped" }).to_owned(),
            running: c.pump,
            mode: (if c.manual_override { "Manual" } else { "Automatic" }).to_owned(),
            runtime: runtime.clone(),
        });

        DashboardSnapshot {
            theme: self.theme,
            online: self.sources.sensors.online,
            sources: self.sources.clone(),
            reading: self.reading.clone(),
            sensors: self.sensors.clone(),
            pump,
            recommendation: self.recommendation.clone(),
            weather: self.weather.clone(),
            stats: Stats {
                water_used_litres: self.water_used_litres,
                water_used: format!("{:.1} L", self.water_used_litres),
                total_runtime: runtime,
            },
            air_quality_popup: self.popup.clone(),
            alert_count: self.alerts.count(),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared handle
// ---------------------------------------------------------------------------

/// Cloneable handle to the single [`Dashboard`] living for the whole process.
#[derive(Debug, Clone)]
pub struct DashboardHandle {
    inner: Arc<RwLock<Dashboard>>,
}

impl DashboardHandle {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            inner: Arc::new(RwLock::new(dashboard)),
        }
    }

    /// Run `f` with exclusive access to the dashboard.
    pub async fn update<R>(&self, f: impl FnOnce(&mut Dashboard) -> R) -> R {
        f(&mut *self.inner.write().await)
    }

    /// Run `f` with shared access to the dashboard.
    pub async fn read<R>(&self, f: impl FnOnce(&Dashboard) -> R) -> R {
        f(&*self.inner.read().await)
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.read(|d| d.snapshot(Utc::now())).await
    }
}
