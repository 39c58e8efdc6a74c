//! Settings for the page reader.
//!
//! All user-tunable values are centralized here and loaded from
//! `conf/settings.toml` if present. Any missing or invalid entries fall
//! back to sensible defaults so the reader can always start, and inbound
//! update messages patch the live values by shallow merge.

mod defaults;
mod io;
mod models;

pub use io::{load_or_init_settings, load_settings, parse_settings, save_settings};
pub use models::{LogLevel, Settings, SettingsHandle, SettingsPatch};

pub const DEFAULT_SETTINGS_PATH: &str = "conf/settings.toml";
