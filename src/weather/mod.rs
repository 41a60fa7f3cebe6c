pub mod models;

use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::fetch::{self, FetchResult};

use self::models::ForecastResponse;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Used when no location is configured (New York City).
    pub const FALLBACK: Coordinates = Coordinates {
        latitude: 40.7128,
        longitude: -74.0060,
    };
}

/// Client for the Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.trim_end_matches('/').to_owned(),
            }),
        }
    }

    fn forecast_url(&self, at: Coordinates) -> String {
        format!(
            "{}/v1/forecast?latitude={}&longitude={}&current_weather=true\
             &daily=temperature_2m_max,temperature_2m_min,weathercode\
             &timezone=auto&forecast_days=3",
            self.inner.base_url, at.latitude, at.longitude
        )
    }

    /// Current conditions plus a three-day daily forecast for `at`.
    pub async fn get_forecast(&self, at: Coordinates) -> FetchResult<ForecastResponse> {
        let url = self.forecast_url(at);
        debug!(latitude = at.latitude, longitude = at.longitude, "Fetching weather forecast");
        fetch::json(&url, self.inner.http.get(&url)).await
    }
}
