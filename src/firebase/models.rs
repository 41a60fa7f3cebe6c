use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// Sensor readings  —  GET {base}/.json
//
// The sensor fields live at the database root next to the `controls` and
// `ai` subtrees, which are ignored here. Every field is optional; firmware
// may omit a sensor or write `null` while it warms up.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SensorPayload {
    pub soil: Option<f64>,
    pub humidity: Option<f64>,
    pub water_level: Option<f64>,
    pub ph: Option<f64>,
    pub air_temp: Option<f64>,
    pub water_temp: Option<f64>,
    pub air_quality: Option<f64>,
    pub flow: Option<f64>,
    pub battery: Option<f64>,
}

impl SensorPayload {
    /// Fill absent fields with zero and stamp the observation time.
    pub fn into_reading(self, observed_at: DateTime<Utc>) -> SensorReading {
        SensorReading {
            observed_at,
            soil: self.soil.unwrap_or_default(),
            humidity: self.humidity.unwrap_or_default(),
            water_level: self.water_level.unwrap_or_default(),
            ph: self.ph.unwrap_or_default(),
            air_temp: self.air_temp.unwrap_or_default(),
            water_temp: self.water_temp.unwrap_or_default(),
            air_quality: self.air_quality.unwrap_or_default(),
            flow: self.flow.unwrap_or_default(),
            battery: self.battery.unwrap_or_default(),
        }
    }
}

/// One complete snapshot of every sensor, as observed by a single poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SensorReading {
    pub observed_at: DateTime<Utc>,
    /// Soil moisture, %
    pub soil: f64,
    /// Relative air humidity, %
    pub humidity: f64,
    /// Tank fill, %
    pub water_level: f64,
    pub ph: f64,
    /// Degrees Celsius
    pub air_temp: f64,
    /// Degrees Celsius
    pub water_temp: f64,
    /// Air quality index
    pub air_quality: f64,
    /// Litres per minute
    pub flow: f64,
    /// Battery charge, %
    pub battery: f64,
}

// ---------------------------------------------------------------------------
// Pump controls  —  GET / PATCH {base}/controls.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PumpControlState {
    #[serde(default)]
    pub pump: bool,
    #[serde(default)]
    pub manual_override: bool,
}

/// Partial update of the controls node. `pump` is omitted when returning
/// to automatic mode so the controller keeps its last decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pump: Option<bool>,
    pub manual_override: bool,
}

impl ControlPatch {
    pub fn manual(pump: bool) -> Self {
        Self {
            pump: Some(pump),
            manual_override: true,
        }
    }

    pub fn automatic() -> Self {
        Self {
            pump: None,
            manual_override: false,
        }
    }
}

// ---------------------------------------------------------------------------
// AI recommendation  —  GET {base}/ai/recommendation.json
// ---------------------------------------------------------------------------

/// Normalise the recommendation node into display text.
///
/// The writer sometimes stores an already-quoted string, so one pair of
/// surrounding double quotes is stripped. `null` and empty text yield `None`.
pub fn recommendation_text(value: serde_json::Value) -> Option<String> {
    let text = match value {
        serde_json::Value::Null => return None,
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    };

    let text = match text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        Some(inner) => inner.to_owned(),
        None => text,
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_and_null_fields_default_to_zero() {
        let payload: SensorPayload =
            serde_json::from_value(json!({ "soil": 41, "ph": null })).unwrap();
        let r = payload.into_reading(Utc::now());
        assert_eq!(r.soil, 41.0);
        assert_eq!(r.ph, 0.0);
        assert_eq!(r.battery, 0.0);
    }

    #[test]
    fn root_payload_ignores_sibling_subtrees() {
        let payload: SensorPayload = serde_json::from_value(json!({
            "water_level": 45.5,
            "controls": { "pump": true, "manual_override": false },
            "ai": { "recommendation": "Water the plants" }
        }))
        .unwrap();
        assert_eq!(payload.water_level, Some(45.5));
    }

    #[test]
    fn controls_missing_fields_are_false() {
        let c: PumpControlState = serde_json::from_value(json!({ "pump": true })).unwrap();
        assert!(c.pump);
        assert!(!c.manual_override);
    }

    #[test]
    fn manual_patch_carries_pump_and_override() {
        let body = serde_json::to_value(ControlPatch::manual(true)).unwrap();
        assert_eq!(body, json!({ "pump": true, "manual_override": true }));
    }

    #[test]
    fn automatic_patch_omits_pump() {
        let body = serde_json::to_value(ControlPatch::automatic()).unwrap();
        assert_eq!(body, json!({ "manual_override": false }));
    }

    #[test]
    fn recommendation_strips_one_layer_of_quotes() {
        assert_eq!(
            recommendation_text(json!("\"Reduce watering\"")),
            Some("Reduce watering".to_owned())
        );
        assert_eq!(
            recommendation_text(json!("Reduce watering")),
            Some("Reduce watering".to_owned())
        );
    }

    #[test]
    fn recommendation_null_or_empty_is_none() {
        assert_eq!(recommendation_text(json!(null)), None);
        assert_eq!(recommendation_text(json!("")), None);
        assert_eq!(recommendation_text(json!("\"\"")), None);
    }

    #[test]
    fn lone_quote_is_kept() {
        assert_eq!(recommendation_text(json!("\"")), Some("\"".to_owned()));
    }
}
