//! Settings persistence: a single `tts_settings` table in a TOML file.
//!
//! Loading never fails outward; a missing or invalid file falls back to
//! defaults so the reader can still start.

use super::models::Settings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct SettingsFile {
    tts_settings: Settings,
}

/// Load settings from `path`, merging the stored record over defaults.
pub fn load_settings(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let settings = parse_settings(&contents);
            info!(path = %path.display(), "Loaded settings");
            settings
        }
        Err(err) => {
            warn!(path = %path.display(), "Falling back to default settings: {err}");
            Settings::default()
        }
    }
}

/// Load settings, writing a defaults file on first run so the user has
/// something to edit. The write is best-effort; reading proceeds either way.
pub fn load_or_init_settings(path: &Path) -> Settings {
    let settings = load_settings(path);
    if !path.exists() {
        match save_settings(path, &settings) {
            Ok(()) => info!(path = %path.display(), "Wrote default settings"),
            Err(err) => warn!(path = %path.display(), "Could not write default settings: {err}"),
        }
    }
    settings
}

pub fn parse_settings(contents: &str) -> Settings {
    match toml::from_str::<SettingsFile>(contents) {
        Ok(file) => file.tts_settings.sanitized(),
        Err(err) => {
            warn!("Invalid settings TOML, using defaults: {err}");
            Settings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Creating settings directory")?;
    }
    let file = SettingsFile {
        tts_settings: settings.clone(),
    };
    let contents = toml::to_string(&file).context("Serializing settings")?;
    fs::write(path, contents)
        .with_context(|| format!("Writing settings to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_merge_over_defaults() {
        let settings = parse_settings("[tts_settings]\nvoice = \"bf_emma\"\n");
        assert_eq!(settings.voice, "bf_emma");
        assert_eq!(settings.api_url, "http://localhost:9942");
        assert_eq!(settings.keybind, "alt+r");
    }

    #[test]
    fn invalid_toml_falls_back_to_defaults() {
        let settings = parse_settings("not toml at all [");
        assert_eq!(settings.voice, "af_heart");
    }

    #[test]
    fn first_run_writes_a_defaults_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("conf").join("settings.toml");

        let settings = load_or_init_settings(&path);
        assert_eq!(settings.voice, "af_heart");
        assert!(path.exists());

        // A second load reads the file it just wrote.
        let reloaded = load_or_init_settings(&path);
        assert_eq!(reloaded.api_url, settings.api_url);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("conf").join("settings.toml");

        let mut settings = Settings::default();
        settings.voice = "am_adam".to_string();
        settings.skip_duplicates = false;
        save_settings(&path, &settings).expect("save should succeed");

        let loaded = load_settings(&path);
        assert_eq!(loaded.voice, "am_adam");
        assert!(!loaded.skip_duplicates);
    }
}
