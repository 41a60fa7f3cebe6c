use std::time::Duration;

use chrono::Utc;
use tokio::{task::JoinHandle, time};
use tracing::{error, info, warn};

use crate::{
    dashboard::DashboardHandle,
    firebase::FirebaseClient,
    weather::{models::WeatherView, Coordinates, WeatherClient},
};

/// Periodically refreshes every data source on the dashboard.
///
/// Each source is fetched by its own task, so a slow or failing source never
/// holds up the others. Cycles may overlap when a request outlives the
/// interval; whichever response lands last wins.
#[derive(Debug, Clone)]
pub struct Poller {
    firebase: FirebaseClient,
    weather: WeatherClient,
    dashboard: DashboardHandle,
    location: Coordinates,
    interval: Duration,
}

impl Poller {
    pub fn new(
        firebase: FirebaseClient,
        weather: WeatherClient,
        dashboard: DashboardHandle,
        location: Coordinates,
        interval: Duration,
    ) -> Self {
        Self {
            firebase,
            weather,
            dashboard,
            location,
            interval,
        }
    }

    /// Runs the polling loop indefinitely. The first cycle starts immediately.
    /// Spawn this via `tokio::spawn`.
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs_f64(), "Polling loop started");
        let mut ticker = time::interval(self.interval);

        loop {
            ticker.tick().await;
            // Handles are dropped: tasks run detached and are never cancelled.
            let _ = self.refresh_all();
        }
    }

    /// Start one independent fetch per source and return their handles.
    pub fn refresh_all(&self) -> Vec<JoinHandle<()>> {
        let sensors = self.clone();
        let controls = self.clone();
        let recommendation = self.clone();
        let weather = self.clone();

        vec![
            tokio::spawn(async move { sensors.refresh_sensors().await }),
            tokio::spawn(async move { controls.refresh_controls().await }),
            tokio::spawn(async move { recommendation.refresh_recommendation().await }),
            tokio::spawn(async move { weather.refresh_weather().await }),
        ]
    }

    pub async fn refresh_sensors(&self) {
        match self.firebase.get_sensor_reading().await {
            Ok(Some(payload)) => {
                let reading = payload.into_reading(Utc::now());
                let alerted = self.dashboard.update(|d| d.apply_reading(reading)).await;
                if alerted {
                    warn!("Air quality entered a hazardous tier");
                }
            }
            Ok(None) => {
                info!("Sensor node is empty; keeping previous reading");
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch sensor data");
                let msg = e.to_string();
                self.dashboard.update(|d| d.sensors_failed(&msg)).await;
            }
        }
    }

    pub async fn refresh_controls(&self) {
        match self.firebase.get_controls().await {
            Ok(Some(controls)) => {
                self.dashboard
                    .update(|d| d.apply_controls(controls, Utc::now()))
                    .await;
            }
            Ok(None) => {
                info!("Controls node is empty; keeping previous pump state");
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch pump status");
                let msg = e.to_string();
                self.dashboard.update(|d| d.controls_failed(&msg)).await;
            }
        }
    }

    pub async fn refresh_recommendation(&self) {
        match self.firebase.get_recommendation().await {
            Ok(text) => {
                self.dashboard
                    .update(|d| d.apply_recommendation(text, Utc::now()))
                    .await;
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch AI recommendation");
                let msg = e.to_string();
                self.dashboard.update(|d| d.recommendation_failed(&msg)).await;
            }
        }
    }

    pub async fn refresh_weather(&self) {
        match self.weather.get_forecast(self.location).await {
            Ok(forecast) => {
                let view = WeatherView::from(&forecast);
                self.dashboard
                    .update(|d| d.apply_weather(view, Utc::now()))
                    .await;
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch weather");
                let msg = e.to_string();
                self.dashboard.update(|d| d.weather_failed(&msg)).await;
            }
        }
    }
}
