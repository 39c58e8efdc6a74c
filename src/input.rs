//! Keybind normalization and matching.
//!
//! Combos are written as `+`-joined lowercase tokens with modifiers in the
//! fixed order ctrl, alt, shift, meta, followed by exactly one key, e.g.
//! `alt+r` or `ctrl+shift+p`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    ctrl: bool,
    alt: bool,
    shift: bool,
    meta: bool,
    key: String,
}

impl KeyCombo {
    /// Parse a configured combo string. Returns `None` when no non-modifier
    /// key is present.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut ctrl = false;
        let mut alt = false;
        let mut shift = false;
        let mut meta = false;
        let mut key: Option<String> = None;

        for token in raw.split('+').map(str::trim).filter(|s| !s.is_empty()) {
            match token.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => ctrl = true,
                "alt" => alt = true,
                "shift" => shift = true,
                "meta" | "super" | "cmd" | "command" => meta = true,
                other => key = Some(other.to_string()),
            }
        }

        key.map(|key| Self::from_event(ctrl, alt, shift, meta, &key))
    }

    /// Build a combo from a raw key event.
    pub fn from_event(ctrl: bool, alt: bool, shift: bool, meta: bool, key: &str) -> Self {
        Self {
            ctrl,
            alt,
            shift,
            meta,
            key: key.to_ascii_lowercase(),
        }
    }

    /// Canonical string form, suitable for storing in settings.
    pub fn normalized(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if self.ctrl {
            parts.push("ctrl");
        }
        if self.alt {
            parts.push("alt");
        }
        if self.shift {
            parts.push("shift");
        }
        if self.meta {
            parts.push("meta");
        }
        parts.push(&self.key);
        parts.join("+")
    }

    /// True when this (usually event-derived) combo matches a configured
    /// keybind string. Modifiers must match exactly.
    pub fn matches(&self, configured: &str) -> bool {
        KeyCombo::parse(configured)
            .map(|combo| combo == *self)
            .unwrap_or(false)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized())
    }
}
