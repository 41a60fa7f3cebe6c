use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Suppression state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    Idle,
    Alerted,
}

/// One-shot alert suppression for a single alert source.
///
/// An alert fires when a hazardous label first appears (or reappears after
/// any other label). Once the user dismisses it, the same label stays quiet
/// for as long as it persists.
#[derive(Debug, Clone)]
pub struct AlertSuppression {
    hazardous: Vec<String>,
    state: ChannelState,
    last_status: Option<String>,
    dismissed_for_status: Option<String>,
}

impl AlertSuppression {
    pub fn new<I, S>(hazardous: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hazardous: hazardous.into_iter().map(Into::into).collect(),
            state: ChannelState::Idle,
            last_status: None,
            dismissed_for_status: None,
        }
    }

    pub fn is_hazardous(&self, label: &str) -> bool {
        self.hazardous.iter().any(|h| h == label)
    }

    /// Record the latest computed label. Returns `true` when a user-facing
    /// alert should be emitted for it.
    pub fn observe(&mut self, label: &str) -> bool {
        // A repeated label keeps whatever was decided for it, dismissal included.
        if self.last_status.as_deref() == Some(label) {
            return false;
        }

        self.last_status = Some(label.to_owned());
        self.dismissed_for_status = None;

        let fire = self.is_hazardous(label);
        self.state = if fire {
            ChannelState::Alerted
        } else {
            ChannelState::Idle
        };
        fire
    }

    /// Acknowledge the current alert; suppresses the current label until it changes.
    pub fn dismiss(&mut self) {
        self.dismissed_for_status = self.last_status.clone();
        self.state = ChannelState::Idle;
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }

    pub fn dismissed_for_status(&self) -> Option<&str> {
        self.dismissed_for_status.as_deref()
    }
}

/// Suppression trackers keyed by alert source.
#[derive(Debug, Clone, Default)]
pub struct AlertChannels {
    channels: HashMap<String, AlertSuppression>,
}

impl AlertChannels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<I, S>(&mut self, channel: &str, hazardous: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels
            .insert(channel.to_owned(), AlertSuppression::new(hazardous));
    }

    /// Returns `false` for unregistered channels.
    pub fn observe(&mut self, channel: &str, label: &str) -> bool {
        self.channels
            .get_mut(channel)
            .map(|c| c.observe(label))
            .unwrap_or(false)
    }

    pub fn dismiss(&mut self, channel: &str) -> bool {
        match self.channels.get_mut(channel) {
            Some(c) => {
                c.dismiss();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, channel: &str) -> Option<&AlertSuppression> {
        self.channels.get(channel)
    }
}

// ---------------------------------------------------------------------------
// Alert feed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Alert {
    pub id: Uuid,
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

/// Newest-first list of alerts shown to the user.
#[derive(Debug, Clone, Default)]
pub struct AlertFeed {
    entries: VecDeque<Alert>,
}

impl AlertFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: AlertKind, title: &str, message: &str) -> Uuid {
        let alert = Alert {
            id: Uuid::new_v4(),
            kind,
            title: title.to_owned(),
            message: message.to_owned(),
            raised_at: Utc::now(),
        };
        let id = alert.id;
        self.entries.push_front(alert);
        id
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Alert> {
        let pos = self.entries.iter().position(|a| a.id == id)?;
        self.entries.remove(pos)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> Vec<Alert> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn air_quality() -> AlertSuppression {
        AlertSuppression::new(["Bad", "Hazardous"])
    }

    #[test]
    fn initial_state_is_idle_and_empty() {
        let s = air_quality();
        assert_eq!(s.state(), ChannelState::Idle);
        assert_eq!(s.last_status(), None);
        assert_eq!(s.dismissed_for_status(), None);
    }

    #[test]
    fn dismissed_hazard_rearms_after_intervening_change() {
        let mut s = air_quality();
        let labels = ["Bad", "Bad", "Bad", "Good", "Bad"];
        let mut fired = Vec::new();

        for (i, label) in labels.iter().enumerate() {
            if s.observe(label) {
                fired.push(i);
            }
            if i == 0 {
                s.dismiss();
            }
        }

        assert_eq!(fired, vec![0, 4]);
    }

    #[test]
    fn persisting_hazard_fires_once_without_dismissal() {
        let mut s = air_quality();
        assert!(s.observe("Hazardous"));
        assert!(!s.observe("Hazardous"));
        assert!(!s.observe("Hazardous"));
        assert_eq!(s.state(), ChannelState::Alerted);
    }

    #[test]
    fn different_hazardous_label_clears_suppression() {
        let mut s = air_quality();
        assert!(s.observe("Bad"));
        s.dismiss();
        assert_eq!(s.dismissed_for_status(), Some("Bad"));

        assert!(s.observe("Hazardous"));
        assert_eq!(s.dismissed_for_status(), None);
    }

    #[test]
    fn non_hazardous_labels_never_fire_and_return_to_idle() {
        let mut s = air_quality();
        assert!(s.observe("Bad"));
        assert!(!s.observe("Average"));
        assert_eq!(s.state(), ChannelState::Idle);
        assert!(!s.observe("Good"));
    }

    #[test]
    fn dismiss_moves_to_idle_and_records_label() {
        let mut s = air_quality();
        s.observe("Hazardous");
        s.dismiss();
        assert_eq!(s.state(), ChannelState::Idle);
        assert_eq!(s.dismissed_for_status(), Some("Hazardous"));
        assert!(!s.observe("Hazardous"));
    }

    #[test]
    fn channels_are_independent() {
        let mut channels = AlertChannels::new();
        channels.register("air_quality", ["Bad", "Hazardous"]);
        channels.register("water_level", ["Low"]);

        assert!(channels.observe("air_quality", "Bad"));
        assert!(channels.observe("water_level", "Low"));
        assert!(channels.dismiss("air_quality"));

        assert!(!channels.observe("air_quality", "Bad"));
        assert_eq!(channels.get("water_level").unwrap().state(), ChannelState::Alerted);
    }

    #[test]
    fn unknown_channel_never_fires() {
        let mut channels = AlertChannels::new();
        assert!(!channels.observe("nope", "Hazardous"));
        assert!(!channels.dismiss("nope"));
    }

    #[test]
    fn feed_is_newest_first_and_counts() {
        let mut feed = AlertFeed::new();
        feed.push(AlertKind::Info, "first", "a");
        let second = feed.push(AlertKind::Warning, "second", "b");

        let entries = feed.entries();
        assert_eq!(feed.count(), 2);
        assert_eq!(entries[0].id, second);
        assert_eq!(entries[1].title, "first");
    }

    #[test]
    fn feed_remove_and_clear() {
        let mut feed = AlertFeed::new();
        let id = feed.push(AlertKind::Success, "t", "m");
        feed.push(AlertKind::Info, "t2", "m2");

        assert_eq!(feed.remove(id).map(|a| a.title), Some("t".to_owned()));
        assert!(feed.remove(id).is_none());
        assert_eq!(feed.count(), 1);

        feed.clear();
        assert_eq!(feed.count(), 0);
    }
}
