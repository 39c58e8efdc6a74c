//! The reading controller: a sequential state machine that walks segmented
//! units, fetches synthesized audio per unit, plays it to completion, and
//! keeps the highlight and action affordance in step.
//!
//! One session at a time. The loop polls the shared stop flag at each
//! iteration boundary; `stop()` can arrive from another thread at any time
//! and also halts the in-flight playback. All exit paths (finish, error,
//! stop) run the same epilogue and leave the controller in `Idle`.

use crate::audio::AudioClient;
use crate::config::SettingsHandle;
use crate::dom::{PageDocument, SelectionRange};
use crate::error::ReadError;
use crate::highlight::HighlightTracker;
use crate::playback::AudioOutput;
use crate::presenter::{SelectionPresenter, SERVER_ERROR_NOTICE};
use crate::segmenter::{segment, ReadableUnit};
use crate::session::{ReaderHandle, SessionShared};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Reading { unit: usize },
    Stopping,
}

/// How a call to [`ReadingController::start`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every unit was processed.
    Completed,
    /// A stop request halted the walk.
    Stopped,
    /// A fetch or playback error aborted the session.
    Failed,
    /// A session was already running; nothing changed.
    AlreadyReading,
}

pub struct ReadingController<O: AudioOutput> {
    settings: SettingsHandle,
    client: AudioClient,
    output: O,
    shared: Arc<SessionShared>,
    presenter: SelectionPresenter,
    highlight: HighlightTracker,
    read_texts: HashSet<String>,
    units: Vec<ReadableUnit>,
    unit_idx: usize,
    in_session: bool,
}

impl<O: AudioOutput> ReadingController<O> {
    pub fn new(settings: SettingsHandle, client: AudioClient, output: O) -> Self {
        let shared = SessionShared::new();
        let presenter = SelectionPresenter::new(settings.clone());
        Self {
            settings,
            client,
            output,
            shared,
            presenter,
            highlight: HighlightTracker::new(),
            read_texts: HashSet::new(),
            units: Vec::new(),
            unit_idx: 0,
            in_session: false,
        }
    }

    /// Handle for asynchronous stop requests from other threads.
    pub fn handle(&self) -> ReaderHandle {
        ReaderHandle::new(self.shared.clone())
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.in_session, self.shared.is_reading()) {
            (false, _) => SessionPhase::Idle,
            (true, true) => SessionPhase::Reading {
                unit: self.unit_idx,
            },
            (true, false) => SessionPhase::Stopping,
        }
    }

    pub fn presenter_mut(&mut self) -> &mut SelectionPresenter {
        &mut self.presenter
    }

    pub fn presenter(&self) -> &SelectionPresenter {
        &self.presenter
    }

    /// Run one reading session over the selection. Blocks until the walk
    /// finishes, fails, or is stopped. A no-op while a session is running.
    pub fn start(&mut self, doc: &PageDocument, range: &SelectionRange) -> SessionOutcome {
        if !self.shared.begin() {
            debug!("Ignoring start request while a session is active");
            return SessionOutcome::AlreadyReading;
        }
        self.in_session = true;

        if self.settings.snapshot().skip_duplicates {
            self.read_texts.clear();
        }
        self.units = segment(doc, range);
        self.unit_idx = 0;
        self.presenter.clear_selection();
        self.presenter.set_reading(true);
        info!(unit_count = self.units.len(), "Starting reading session");

        let outcome = match self.read_units(doc) {
            Ok(()) if self.shared.is_reading() => SessionOutcome::Completed,
            Ok(()) => SessionOutcome::Stopped,
            Err(err) => {
                warn!("Reading session failed: {err}");
                self.presenter.show_error(SERVER_ERROR_NOTICE);
                SessionOutcome::Failed
            }
        };

        self.finish_session();
        info!(?outcome, "Reading session ended");
        outcome
    }

    fn read_units(&mut self, doc: &PageDocument) -> Result<(), ReadError> {
        for i in 0..self.units.len() {
            if !self.shared.is_reading() {
                break;
            }
            self.unit_idx = i;
            let unit = self.units[i];

            // Re-resolve the text at use time; a unit detached from the
            // page since segmentation is skipped, not an error.
            let Some(text) = unit.trimmed_text(doc) else {
                debug!(unit = i, "Skipping detached unit");
                continue;
            };
            if text.is_empty() {
                continue;
            }

            let (auto_highlight, skip_duplicates) = {
                let settings = self.settings.snapshot();
                (settings.auto_highlight, settings.skip_duplicates)
            };
            if skip_duplicates && self.read_texts.contains(&text) {
                debug!(unit = i, "Skipping already-spoken text");
                continue;
            }

            if auto_highlight {
                self.highlight.mark(unit.id());
                debug!(unit = i, class = crate::highlight::HIGHLIGHT_CLASS, "Highlighting unit");
            }
            let spoken = self.speak(&text);
            if auto_highlight {
                self.highlight.clear();
            }

            match spoken {
                Ok(true) => {
                    if skip_duplicates {
                        self.read_texts.insert(text);
                    }
                }
                // Stop raced the fetch; the clip is discarded silently.
                Ok(false) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Fetch and play one unit's text. Returns `Ok(false)` when a stop
    /// request landed while the fetch was outstanding.
    fn speak(&mut self, text: &str) -> Result<bool, ReadError> {
        let clip = {
            let settings = self.settings.snapshot();
            self.client.generate(&settings, text)?
        };
        if !self.shared.is_reading() {
            return Ok(false);
        }

        let playback = self.output.play(clip)?;
        self.shared.set_active(playback.clone());
        // A stop request that landed before the handle was registered
        // could not reach it; settle it here.
        if !self.shared.is_reading() {
            playback.stop();
        }
        playback.wait();
        self.shared.take_active();
        Ok(true)
    }

    /// Session epilogue, shared by every exit path.
    fn finish_session(&mut self) {
        self.shared.request_stop();
        self.highlight.clear();
        self.presenter.set_reading(false);
        self.units.clear();
        self.unit_idx = 0;
        if self.settings.snapshot().skip_duplicates {
            self.read_texts.clear();
        }
        self.in_session = false;
    }

    /// Page teardown: stop whatever is running and release the playback
    /// engine.
    pub fn shutdown(&mut self) {
        self.shared.request_stop();
        if self.in_session {
            self.finish_session();
        }
        self.presenter.hide_button();
        self.output.release();
        debug!("Controller torn down");
    }
}
