#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use aquaclima_monitor::{
    api::AppState,
    dashboard::{Dashboard, DashboardHandle},
    firebase::FirebaseClient,
    poller::Poller,
    preferences::{PreferenceStore, Theme},
    pump::PumpController,
    weather::{Coordinates, WeatherClient},
};

/// What the fake upstream answers on one endpoint.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Raw(&'static str),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(v) => Json(v).into_response(),
            Reply::Status(code) => StatusCode::from_u16(code)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
                .into_response(),
            Reply::Raw(body) => body.into_response(),
        }
    }
}

#[derive(Debug)]
pub struct Replies {
    pub root: Reply,
    pub controls: Reply,
    pub patch: Reply,
    pub recommendation: Reply,
    pub forecast: Reply,
    pub patches: Vec<Value>,
    /// GET requests served, keyed by endpoint name.
    pub hits: BTreeMap<&'static str, usize>,
}

/// Endpoint names fetched once per poll cycle.
pub const POLLED: [&str; 4] = ["root", "controls", "recommendation", "forecast"];

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

impl Default for Replies {
    fn default() -> Self {
        Self {
            root: Reply::Json(sensor_json()),
            controls: Reply::Json(json!({ "pump": false, "manual_override": false })),
            patch: Reply::Status(200),
            recommendation: Reply::Json(json!("\"Irrigate for 10 minutes at dusk\"")),
            forecast: Reply::Json(forecast_json()),
            patches: Vec::new(),
            hits: BTreeMap::new(),
        }
    }
}

pub fn sensor_json() -> Value {
    json!({
        "soil": 45,
        "humidity": 62,
        "water_level": 45,
        "ph": 6.8,
        "air_temp": 27.5,
        "water_temp": 21,
        "air_quality": 40,
        "flow": 2.5,
        "battery": 80,
        "controls": { "pump": false, "manual_override": false },
    })
}

pub fn forecast_json() -> Value {
    json!({
        "current_weather": { "temperature": 18.3, "weathercode": 3, "windspeed": 9.7 },
        "daily": {
            "time": ["2024-05-06", "2024-05-07", "2024-05-08", "2024-05-09"],
            "temperature_2m_max": [19.0, 21.4, 23.6, 17.2],
            "temperature_2m_min": [8.0, 9.0, 11.0, 7.0],
            "weathercode": [3, 0, 61, 95],
        },
    })
}

/// In-process stand-in for the Firebase database and the Open-Meteo API.
#[derive(Debug, Clone, Default)]
pub struct Upstream {
    replies: Arc<Mutex<Replies>>,
}

impl Upstream {
    pub fn set(&self, f: impl FnOnce(&mut Replies)) {
        f(&mut self.replies.lock().unwrap());
    }

    pub fn patches(&self) -> Vec<Value> {
        self.replies.lock().unwrap().patches.clone()
    }

    pub fn hits(&self, endpoint: &str) -> usize {
        self.replies.lock().unwrap().hits.get(endpoint).copied().unwrap_or(0)
    }

    fn serve(&self, endpoint: &'static str, pick: impl FnOnce(&Replies) -> Reply) -> Reply {
        let mut replies = self.replies.lock().unwrap();
        *replies.hits.entry(endpoint).or_default() += 1;
        pick(&*replies)
    }

    /// Bind to an ephemeral port and serve until the test runtime ends.
    pub async fn start(&self) -> String {
        let app = Router::new()
            .route("/.json", get(root))
            .route("/controls.json", get(controls).patch(patch_controls))
            .route("/ai/recommendation.json", get(recommendation))
            .route("/v1/forecast", get(forecast))
            .with_state(self.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn root(State(up): State<Upstream>) -> Reply {
    up.serve("root", |r| r.root.clone())
}

async fn controls(State(up): State<Upstream>) -> Reply {
    up.serve("controls", |r| r.controls.clone())
}

async fn patch_controls(State(up): State<Upstream>, Json(body): Json<Value>) -> Reply {
    let mut replies = up.replies.lock().unwrap();
    replies.patches.push(body.clone());
    match &replies.patch {
        Reply::Status(200) => Reply::Json(body),
        other => other.clone(),
    }
}

async fn recommendation(State(up): State<Upstream>) -> Reply {
    up.serve("recommendation", |r| r.recommendation.clone())
}

async fn forecast(State(up): State<Upstream>) -> Reply {
    up.serve("forecast", |r| r.forecast.clone())
}

pub struct Harness {
    pub upstream: Upstream,
    pub state: AppState,
}

pub async fn harness() -> Harness {
    let upstream = Upstream::default();
    let base = upstream.start().await;

    let http = reqwest::Client::new();
    // Trailing slash as in a copied Firebase console URL.
    let firebase = FirebaseClient::new(http.clone(), &format!("{base}/"));
    let weather = WeatherClient::new(http, &base);
    let dashboard = DashboardHandle::new(Dashboard::new(Theme::Light, 100));

    let poller = Poller::new(
        firebase.clone(),
        weather,
        dashboard.clone(),
        Coordinates::FALLBACK,
        POLL_INTERVAL,
    );

    let prefs_path = std::env::temp_dir()
        .join(format!("aquaclima-test-{}", uuid::Uuid::new_v4()))
        .join("preferences.json");

    let state = AppState {
        pump: PumpController::new(firebase, dashboard.clone()),
        dashboard,
        poller,
        preferences: PreferenceStore::new(prefs_path),
    };

    Harness { upstream, state }
}

/// Run one full refresh cycle and wait for every source to settle.
pub async fn refresh_and_wait(state: &AppState) {
    for handle in state.poller.refresh_all() {
        handle.await.unwrap();
    }
}

/// Poll `cond` every 10ms until it holds; panics after `attempts` tries.
pub async fn wait_until(attempts: usize, mut cond: impl FnMut() -> bool) {
    for _ in 0..attempts {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met after {attempts} attempts");
}
