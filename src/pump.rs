use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::{
    alerts::AlertKind,
    dashboard::DashboardHandle,
    fetch::FetchResult,
    firebase::{models::ControlPatch, FirebaseClient},
};

/// Pump command issued from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PumpCommand {
    Start,
    Stop,
    Auto,
}

impl PumpCommand {
    pub fn patch(self) -> ControlPatch {
        match self {
            PumpCommand::Start => ControlPatch::manual(true),
            PumpCommand::Stop => ControlPatch::manual(false),
            PumpCommand::Auto => ControlPatch::automatic(),
        }
    }

    fn feed_entry(self) -> (AlertKind, &'static str, &'static str) {
        match self {
            PumpCommand::Start => (AlertKind::Info, "Pump Control", "Pump started manually"),
            PumpCommand::Stop => (AlertKind::Info, "Pump Control", "Pump stopped manually"),
            PumpCommand::Auto => (
                AlertKind::Success,
                "Auto Mode",
                "System returned to automatic mode",
            ),
        }
    }
}

/// Sends pump commands to the controls node.
///
/// Local pump state is never updated here; the next controls poll is the
/// only source of truth.
#[derive(Debug, Clone)]
pub struct PumpController {
    firebase: FirebaseClient,
    dashboard: DashboardHandle,
}

impl PumpController {
    pub fn new(firebase: FirebaseClient, dashboard: DashboardHandle) -> Self {
        Self { firebase, dashboard }
    }

    pub async fn send(&self, command: PumpCommand) -> FetchResult<()> {
        let patch = command.patch();
        if let Err(e) = self.firebase.patch_controls(&patch).await {
            error!(?command, error = %e, "Failed to update pump state");
            return Err(e);
        }

        info!(?command, "Pump command accepted");
        let (kind, title, message) = command.feed_entry();
        self.dashboard
            .update(|d| d.push_alert(kind, title, message))
            .await;
        Ok(())
    }
}
