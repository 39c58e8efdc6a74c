pub(crate) fn default_api_url() -> String {
    "http://localhost:9942".to_string()
}

pub(crate) fn default_voice() -> String {
    "af_heart".to_string()
}

pub(crate) fn default_speed() -> f32 {
    1.2
}

pub(crate) fn default_speed_boost() -> f32 {
    1.5
}

pub(crate) fn default_auto_highlight() -> bool {
    true
}

pub(crate) fn default_skip_duplicates() -> bool {
    true
}

pub(crate) fn default_show_button() -> bool {
    true
}

pub(crate) fn default_keybind() -> String {
    "alt+r".to_string()
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Debug
}
