//! Selection-change presenter: the floating Read/Stop action and the
//! transient error notice.
//!
//! This is the trigger surface for the reading controller. The button is
//! created next to a non-empty selection, hidden when the selection
//! collapses, and left alone while a session is running so it can keep
//! showing the Stop affordance.

use crate::config::SettingsHandle;
use std::time::{Duration, Instant};
use tracing::debug;

pub const READ_LABEL: &str = "▶ Read";
pub const STOP_LABEL: &str = "⏹ Stop";

/// How long an error notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

pub const SERVER_ERROR_NOTICE: &str =
    "Failed to read text. Make sure the TTS server is running.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Read,
    Stop,
}

/// The floating action near the selection. Captures the selection text at
/// creation time as a fallback for clicks after the live selection is gone.
#[derive(Debug, Clone)]
pub struct FloatingAction {
    state: ActionState,
    captured_text: String,
}

impl FloatingAction {
    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn label(&self) -> &'static str {
        match self.state {
            ActionState::Read => READ_LABEL,
            ActionState::Stop => STOP_LABEL,
        }
    }
}

/// What a click on the floating action asks the controller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    Start(String),
    Stop,
}

/// A user-visible transient error overlay.
#[derive(Debug, Clone)]
pub struct Notice {
    message: String,
    raised_at: Instant,
}

impl Notice {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            raised_at: Instant::now(),
        }
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) < NOTICE_TTL
    }
}

pub struct SelectionPresenter {
    settings: SettingsHandle,
    button: Option<FloatingAction>,
    reading: bool,
    live_selection: String,
    notice: Option<Notice>,
}

impl SelectionPresenter {
    pub fn new(settings: SettingsHandle) -> Self {
        Self {
            settings,
            button: None,
            reading: false,
            live_selection: String::new(),
            notice: None,
        }
    }

    /// Feed a platform selection-change event.
    pub fn selection_changed(&mut self, selection: &str) {
        self.live_selection = selection.to_string();
        if self.reading {
            return;
        }
        if selection.trim().is_empty() {
            self.hide_button();
        } else {
            self.show_button(selection);
        }
    }

    fn show_button(&mut self, selection: &str) {
        if !self.settings.snapshot().show_button {
            return;
        }
        self.button = Some(FloatingAction {
            state: ActionState::Read,
            captured_text: selection.trim().to_string(),
        });
    }

    pub fn hide_button(&mut self) {
        self.button = None;
    }

    /// Swap the action affordance between Read and Stop.
    pub fn set_reading(&mut self, reading: bool) {
        self.reading = reading;
        if let Some(button) = &mut self.button {
            button.state = if reading {
                ActionState::Stop
            } else {
                ActionState::Read
            };
        }
    }

    /// Clear the tracked platform selection (done once reading begins).
    pub fn clear_selection(&mut self) {
        self.live_selection.clear();
    }

    /// Resolve a click on the floating action. Uses the live selection text
    /// when present, otherwise the text captured at button creation.
    pub fn click(&self) -> Option<ActionRequest> {
        let button = self.button.as_ref()?;
        if self.reading {
            return Some(ActionRequest::Stop);
        }
        let live = self.live_selection.trim();
        let text = if live.is_empty() {
            button.captured_text.clone()
        } else {
            live.to_string()
        };
        if text.is_empty() {
            None
        } else {
            Some(ActionRequest::Start(text))
        }
    }

    /// Resolve a keybind or programmatic toggle. Unlike [`Self::click`],
    /// this works with the button hidden: hiding the affordance never
    /// disables reading itself.
    pub fn toggle_request(&self) -> Option<ActionRequest> {
        if self.reading {
            return Some(ActionRequest::Stop);
        }
        if let Some(request) = self.click() {
            return Some(request);
        }
        let live = self.live_selection.trim();
        (!live.is_empty()).then(|| ActionRequest::Start(live.to_string()))
    }

    pub fn show_error(&mut self, message: &str) {
        debug!(%message, "Raising error notice");
        self.notice = Some(Notice::new(message));
    }

    pub fn visible_notice(&self, now: Instant) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|notice| notice.is_visible(now))
            .map(|notice| notice.message.as_str())
    }

    pub fn button(&self) -> Option<&FloatingAction> {
        self.button.as_ref()
    }
}
