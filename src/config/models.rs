use crate::input::KeyCombo;
use serde::Deserialize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// User-tunable reader settings; deserializable from TOML and patchable
/// from inbound update messages.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct Settings {
    #[serde(default = "crate::config::defaults::default_api_url")]
    pub api_url: String,
    #[serde(default = "crate::config::defaults::default_voice")]
    pub voice: String,
    #[serde(default = "crate::config::defaults::default_speed")]
    pub speed: f32,
    #[serde(default = "crate::config::defaults::default_speed_boost")]
    pub speed_boost: f32,
    #[serde(default = "crate::config::defaults::default_auto_highlight")]
    pub auto_highlight: bool,
    #[serde(default = "crate::config::defaults::default_skip_duplicates")]
    pub skip_duplicates: bool,
    #[serde(default = "crate::config::defaults::default_show_button")]
    pub show_button: bool,
    #[serde(default = "crate::config::defaults::default_keybind")]
    pub keybind: String,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_url: crate::config::defaults::default_api_url(),
            voice: crate::config::defaults::default_voice(),
            speed: crate::config::defaults::default_speed(),
            speed_boost: crate::config::defaults::default_speed_boost(),
            auto_highlight: crate::config::defaults::default_auto_highlight(),
            skip_duplicates: crate::config::defaults::default_skip_duplicates(),
            show_button: crate::config::defaults::default_show_button(),
            keybind: crate::config::defaults::default_keybind(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl Settings {
    /// Replace invalid fields with their defaults. The API URL must be an
    /// http/https URL, speeds must be positive, and the keybind must name at
    /// least one non-modifier key.
    pub fn sanitized(mut self) -> Self {
        if !is_http_url(&self.api_url) {
            warn!(api_url = %self.api_url, "Ignoring non-http(s) API URL");
            self.api_url = crate::config::defaults::default_api_url();
        }
        if !(self.speed > 0.0) {
            warn!(speed = self.speed, "Ignoring non-positive speed");
            self.speed = crate::config::defaults::default_speed();
        }
        if !(self.speed_boost > 0.0) {
            warn!(speed_boost = self.speed_boost, "Ignoring non-positive speed boost");
            self.speed_boost = crate::config::defaults::default_speed_boost();
        }
        match KeyCombo::parse(&self.keybind) {
            Some(combo) => self.keybind = combo.normalized(),
            None => {
                warn!(keybind = %self.keybind, "Ignoring unparseable keybind");
                self.keybind = crate::config::defaults::default_keybind();
            }
        }
        self
    }

    /// Shallow merge of an update patch over the current values.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(api_url) = patch.api_url {
            self.api_url = api_url;
        }
        if let Some(voice) = patch.voice {
            self.voice = voice;
        }
        if let Some(speed) = patch.speed {
            self.speed = speed;
        }
        if let Some(speed_boost) = patch.speed_boost {
            self.speed_boost = speed_boost;
        }
        if let Some(auto_highlight) = patch.auto_highlight {
            self.auto_highlight = auto_highlight;
        }
        if let Some(skip_duplicates) = patch.skip_duplicates {
            self.skip_duplicates = skip_duplicates;
        }
        if let Some(show_button) = patch.show_button {
            self.show_button = show_button;
        }
        if let Some(keybind) = patch.keybind {
            self.keybind = keybind;
        }
        if let Some(log_level) = patch.log_level {
            self.log_level = log_level;
        }
    }
}

/// Partial settings carried by an update message; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub api_url: Option<String>,
    pub voice: Option<String>,
    pub speed: Option<f32>,
    pub speed_boost: Option<f32>,
    pub auto_highlight: Option<bool>,
    pub skip_duplicates: Option<bool>,
    pub show_button: Option<bool>,
    pub keybind: Option<String>,
    pub log_level: Option<LogLevel>,
}

/// Shared live settings. Updates arrive asynchronously and become visible
/// to the reading loop at its next iteration boundary.
#[derive(Clone)]
pub struct SettingsHandle {
    inner: Arc<Mutex<Settings>>,
}

impl SettingsHandle {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(settings)),
        }
    }

    pub fn snapshot(&self) -> Settings {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn apply(&self, patch: SettingsPatch) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.apply(patch);
        *guard = guard.clone().sanitized();
        info!(api_url = %guard.api_url, voice = %guard.voice, "Applied settings update");
    }

    /// Apply a JSON-encoded update message.
    pub fn apply_json(&self, payload: &str) -> anyhow::Result<()> {
        let patch: SettingsPatch = serde_json::from_str(payload)?;
        self.apply(patch);
        Ok(())
    }
}

fn is_http_url(raw: &str) -> bool {
    reqwest::Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
