use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// Open-Meteo forecast  —  GET /v1/forecast
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub current_weather: CurrentWeather,
    pub daily: Option<DailyForecast>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeather {
    /// Degrees Celsius
    pub temperature: f64,
    /// WMO weather interpretation code
    pub weathercode: i64,
    /// km/h
    pub windspeed: f64,
}

/// Parallel arrays, one element per forecast day starting today.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyForecast {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<f64>,
    pub weathercode: Vec<i64>,
}

// ---------------------------------------------------------------------------
// Display model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherView {
    /// e.g. `"21°C, Partly cloudy"`
    pub summary: String,
    /// e.g. `"Wind: 12.4 km/h"`
    pub details: String,
    pub forecast: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastDay {
    /// Short weekday name, e.g. `"Tue"`
    pub day: String,
    pub icon: String,
    pub max_temp: i64,
}

impl WeatherView {
    pub fn unavailable() -> Self {
        Self {
            summary: "Weather data unavailable".to_owned(),
            details: String::new(),
            forecast: Vec::new(),
        }
    }
}

impl From<&ForecastResponse> for WeatherView {
    fn from(resp: &ForecastResponse) -> Self {
        let current = &resp.current_weather;
        let summary = format!(
            "{}°C, {}",
            current.temperature.round() as i64,
            describe(current.weathercode)
        );
        let details = format!("Wind: {} km/h", current.windspeed);

        // Day 0 is today and is already covered by `current_weather`.
        let forecast = resp
            .daily
            .as_ref()
            .map(|daily| {
                let days = daily
                    .time
                    .len()
                    .min(daily.temperature_2m_max.len())
                    .min(daily.weathercode.len())
                    .min(4);
                (1..days)
                    .map(|i| ForecastDay {
                        day: weekday(&daily.time[i]),
                        icon: icon(daily.weathercode[i]).to_owned(),
                        max_temp: daily.temperature_2m_max[i].round() as i64,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            summary,
            details,
            forecast,
        }
    }
}

fn weekday(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%a").to_string())
        .unwrap_or_else(|_| date.to_owned())
}

/// Human-readable text for a WMO weather code.
pub fn describe(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        80 => "Rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        95 => "Thunderstorm",
        _ => "Unknown conditions",
    }
}

/// Font Awesome icon class for a WMO weather code.
pub fn icon(code: i64) -> &'static str {
    match code {
        0 | 1 => "fas fa-sun",
        2 => "fas fa-cloud-sun",
        3 => "fas fa-cloud",
        45 | 48 => "fas fa-smog",
        51 | 53 => "fas fa-cloud-drizzle",
        55 | 61 | 63 | 80 | 81 => "fas fa-cloud-rain",
        65 | 82 => "fas fa-cloud-showers-heavy",
        71 | 73 | 75 => "fas fa-snowflake",
        95 => "fas fa-bolt",
        _ => "fas fa-question",
    }
}
