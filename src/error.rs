//! Session error taxonomy for the reading controller.
//!
//! Settings-load failures are not represented here; they are recovered
//! locally inside `config` by falling back to defaults. A stop requested
//! while a unit is in flight is not an error either, only a discard.

use thiserror::Error;

/// Errors that abort a reading session. Every variant terminates the whole
/// session; there is no per-unit retry or skip-and-continue.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The audio request could not be sent or the response body was lost.
    #[error("audio request failed: {0}")]
    Network(String),

    /// The audio service answered with a non-success status.
    #[error("audio service returned status {status}")]
    Http { status: u16 },

    /// Decoding or playing a synthesized clip failed.
    #[error("audio playback failed: {0}")]
    Playback(String),
}
