use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::weather::Coordinates;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the realtime database, e.g. `https://<project>.firebaseio.com/`.
    pub firebase_url: String,
    pub weather_base_url: String,
    /// `None` means no location was configured; the poller then uses
    /// [`Coordinates::FALLBACK`].
    pub location: Option<Coordinates>,
    pub poll_interval: Duration,
    pub server_host: String,
    pub server_port: u16,
    /// JSON file holding the persisted theme preference.
    pub preferences_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let poll_interval_secs: u64 = optional("POLL_INTERVAL_SECS", "5")
            .parse()
            .context("POLL_INTERVAL_SECS must be a positive integer")?;
        if poll_interval_secs == 0 {
            bail!("POLL_INTERVAL_SECS must be a positive integer");
        }

        Ok(Self {
            firebase_url: required("FIREBASE_URL")?,
            weather_base_url: optional("WEATHER_BASE_URL", "https://api.open-meteo.com"),
            location: parse_location(
                std::env::var("LATITUDE").ok().as_deref(),
                std::env::var("LONGITUDE").ok().as_deref(),
            )?,
            poll_interval: Duration::from_secs(poll_interval_secs),
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            preferences_path: optional("PREFERENCES_PATH", "preferences.json"),
        })
    }

    pub fn location_or_fallback(&self) -> Coordinates {
        self.location.unwrap_or(Coordinates::FALLBACK)
    }
}

/// Parse an optional latitude/longitude pair. Both or neither must be set.
fn parse_location(lat: Option<&str>, lon: Option<&str>) -> Result<Option<Coordinates>> {
    let (lat, lon) = match (lat.map(str::trim), lon.map(str::trim)) {
        (None, None) => return Ok(None),
        (Some(""), Some("")) => return Ok(None),
        (Some(lat), Some(lon)) => (lat, lon),
        _ => bail!("LATITUDE and LONGITUDE must be set together"),
    };

    let latitude: f64 = lat
        .parse()
        .with_context(|| format!("LATITUDE must be a number, got {lat:?}"))?;
    let longitude: f64 = lon
        .parse()
        .with_context(|| format!("LONGITUDE must be a number, got {lon:?}"))?;

    if !(-90.0..=90.0).contains(&latitude) {
        bail!("LATITUDE out of range: {latitude}");
    }
    if !(-180.0..=180.0).contains(&longitude) {
        bail!("LONGITUDE out of range: {longitude}");
    }

    Ok(Some(Coordinates { latitude, longitude }))
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required env var: {key}"))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
