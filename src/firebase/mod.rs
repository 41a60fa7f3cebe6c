pub mod models;

use std::sync::Arc;

use reqwest::Client;
use tracing::debug;

use crate::fetch::{self, FetchResult};

use self::models::{recommendation_text, ControlPatch, PumpControlState, SensorPayload};

/// REST client for the Firebase realtime database holding sensor and
/// control state. Cheap to clone.
#[derive(Debug, Clone)]
pub struct FirebaseClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    base_url: String,
}

impl FirebaseClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.trim_end_matches('/').to_owned(),
            }),
        }
    }

    fn url(&self, node: &str) -> String {
        format!("{}/{}.json", self.inner.base_url, node)
    }

    /// Fetch the latest sensor snapshot. `None` when the database is empty.
    pub async fn get_sensor_reading(&self) -> FetchResult<Option<SensorPayload>> {
        let url = self.url("");
        debug!(url = %url, "Fetching sensor reading");
        fetch::json(&url, self.inner.http.get(&url)).await
    }

    pub async fn get_controls(&self) -> FetchResult<Option<PumpControlState>> {
        let url = self.url("controls");
        debug!(url = %url, "Fetching pump controls");
        fetch::json(&url, self.inner.http.get(&url)).await
    }

    pub async fn get_recommendation(&self) -> FetchResult<Option<String>> {
        let url = self.url("ai/recommendation");
        debug!(url = %url, "Fetching AI recommendation");
        let value: serde_json::Value = fetch::json(&url, self.inner.http.get(&url)).await?;
        Ok(recommendation_text(value))
    }

    /// Apply a partial update to the controls node.
    pub async fn patch_controls(&self, patch: &ControlPatch) -> FetchResult<()> {
        let url = self.url("controls");
        debug!(url = %url, ?patch, "Patching pump controls");
        // `.json()` sets `Content-Type: application/json`.
        fetch::send(&url, self.inner.http.patch(&url).json(patch)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let c = FirebaseClient::new(Client::new(), "https://db.example.com/");
        assert_eq!(c.url(""), "https://db.example.com/.json");
        assert_eq!(c.url("controls"), "https://db.example.com/controls.json");
        assert_eq!(
            c.url("ai/recommendation"),
            "https://db.example.com/ai/recommendation.json"
        );
    }
}
