use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aquaclima_monitor::{
    alerts::AlertKind,
    api::{self, AppState},
    config::Config,
    dashboard::{Dashboard, DashboardHandle},
    firebase::FirebaseClient,
    history,
    poller::Poller,
    preferences::PreferenceStore,
    pump::PumpController,
    weather::WeatherClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent, env vars may be set externally)
    let _ = dotenvy::dotenv();

    // Initialise tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    if config.location.is_none() {
        info!("No LATITUDE/LONGITUDE configured; using fallback weather location");
    }

    // Restore persisted theme and build the single dashboard state object
    let preferences = PreferenceStore::new(&config.preferences_path);
    let theme = preferences.theme().await;
    let dashboard = DashboardHandle::new(Dashboard::new(theme, history::DEFAULT_CAPACITY));
    info!(theme = theme.as_str(), "Dashboard state ready");

    // One HTTP connection pool shared by both upstream clients
    let http = reqwest::Client::new();
    let firebase = FirebaseClient::new(http.clone(), &config.firebase_url);
    let weather = WeatherClient::new(http, &config.weather_base_url);

    let poller = Poller::new(
        firebase.clone(),
        weather,
        dashboard.clone(),
        config.location_or_fallback(),
        config.poll_interval,
    );
    tokio::spawn(poller.clone().run());

    dashboard
        .update(|d| {
            d.push_alert(
                AlertKind::Info,
                "System Started",
                "AQUACLIMA dashboard initialized successfully",
            )
        })
        .await;

    let state = AppState {
        pump: PumpController::new(firebase, dashboard.clone()),
        dashboard,
        poller,
        preferences,
    };

    // Start HTTP server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
