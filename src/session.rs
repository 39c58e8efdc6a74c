//! Shared session primitives: the polling stop flag and the slot holding
//! the single in-flight playback handle.
//!
//! Cancellation is cooperative. The reading loop checks the flag at each
//! iteration boundary; an outstanding audio fetch is allowed to complete
//! and its result discarded, but an already-started playback is stopped
//! actively through the stored handle.

use crate::playback::PlaybackHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

#[derive(Default)]
pub struct SessionShared {
    reading: AtomicBool,
    active: Mutex<Option<Arc<dyn PlaybackHandle>>>,
}

impl SessionShared {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim the session slot. Returns false when a session is already
    /// running, in which case the caller must treat `start` as a no-op.
    pub fn begin(&self) -> bool {
        self.reading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_reading(&self) -> bool {
        self.reading.load(Ordering::Acquire)
    }

    /// Clear the reading flag and stop the in-flight playback, if any.
    /// Stopping already-finished playback is harmless and ignored.
    pub fn request_stop(&self) {
        self.reading.store(false, Ordering::Release);
        if let Some(handle) = self.take_active() {
            debug!("Stopping in-flight playback");
            handle.stop();
        }
    }

    pub fn set_active(&self, handle: Arc<dyn PlaybackHandle>) {
        *self.lock_active() = Some(handle);
    }

    pub fn take_active(&self) -> Option<Arc<dyn PlaybackHandle>> {
        self.lock_active().take()
    }

    fn lock_active(
        &self,
    ) -> std::sync::MutexGuard<'_, Option<Arc<dyn PlaybackHandle>>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clonable handle for asynchronous stop requests (keybind, button click,
/// Ctrl-C, page teardown).
#[derive(Clone)]
pub struct ReaderHandle {
    shared: Arc<SessionShared>,
}

impl ReaderHandle {
    pub fn new(shared: Arc<SessionShared>) -> Self {
        Self { shared }
    }

    pub fn stop(&self) {
        self.shared.request_stop();
    }

    pub fn is_reading(&self) -> bool {
        self.shared.is_reading()
    }
}
