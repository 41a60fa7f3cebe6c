//! Client-side preferences persisted to a small JSON key/value file.
//!
//! I/O failures are logged and swallowed; the service then runs with the
//! default theme.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{
    fs,
    sync::{Mutex, MutexGuard},
};
use tracing::{debug, warn};
use utoipa::ToSchema;

const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

/// Exclusive write access to the preference file. Writes made through one
/// guard after another land on disk in the same order.
#[derive(Debug)]
pub struct PreferenceWriter<'a> {
    store: &'a PreferenceStore,
    _guard: MutexGuard<'a, ()>,
}

impl PreferenceWriter<'_> {
    pub async fn set_theme(&self, theme: Theme) {
        self.store.write_key(THEME_KEY, theme.as_str()).await;
        debug!(path = %self.store.path.display(), theme = theme.as_str(), "preferences: theme saved");
    }
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for exclusive write access. Hold the returned writer across any
    /// in-memory change that must reach the disk in order.
    pub async fn lock(&self) -> PreferenceWriter<'_> {
        PreferenceWriter {
            store: self,
            _guard: self.write_lock.lock().await,
        }
    }

    async fn read_all(&self) -> Map<String, Value> {
        let bytes = match fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "preferences: failed to read file");
                return Map::new();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "preferences: file is not a JSON object");
            Map::new()
        })
    }

    /// Stored theme, `Light` when absent or unreadable.
    pub async fn theme(&self) -> Theme {
        self.read_all()
            .await
            .get(THEME_KEY)
            .and_then(Value::as_str)
            .and_then(Theme::parse)
            .unwrap_or_default()
    }

    pub async fn set_theme(&self, theme: Theme) {
        self.lock().await.set_theme(theme).await;
    }

    /// Read-modify-write of a single key; other keys are written back as read.
    /// Callers hold the write lock.
    async fn write_key(&self, key: &str, value: &str) {
        let mut all = self.read_all().await;
        all.insert(key.to_owned(), Value::String(value.to_owned()));

        let content = match serde_json::to_vec_pretty(&all) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "preferences: failed to serialise");
                return;
            }
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(dir).await {
                warn!(path = %self.path.display(), error = %e, "preferences: failed to create directory");
                return;
            }
        }

        if let Err(e) = fs::write(&self.path, &content).await {
            warn!(path = %self.path.display(), error = %e, "preferences: failed to write file");
        }
    }
}
