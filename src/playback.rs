//! Audio output seam and the rodio implementation.
//!
//! Clips arrive as whole byte buffers (no streaming): decode, then play to
//! completion. The output stream is created lazily on first playback and
//! released on teardown so a fresh one can be opened for a later session.

use crate::error::ReadError;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::io::Cursor;
use std::sync::Arc;
use tracing::debug;

/// One unit's playback in flight. `wait` blocks until the clip ends or the
/// sink is stopped; `stop` may race a natural finish and must stay harmless.
pub trait PlaybackHandle: Send + Sync {
    fn wait(&self);
    fn stop(&self);
}

/// Where decoded clips go. The reading controller owns exactly one output.
pub trait AudioOutput {
    /// Decode `clip` and start playing it, returning a handle the session
    /// uses to await completion and to stop early.
    fn play(&mut self, clip: Vec<u8>) -> Result<Arc<dyn PlaybackHandle>, ReadError>;

    /// Release any held device resources. Playing again after a release is
    /// allowed and re-acquires them.
    fn release(&mut self) {}
}

pub struct RodioOutput {
    stream: Option<(OutputStream, OutputStreamHandle)>,
}

impl RodioOutput {
    pub fn new() -> Self {
        Self { stream: None }
    }
}

impl AudioOutput for RodioOutput {
    fn play(&mut self, clip: Vec<u8>) -> Result<Arc<dyn PlaybackHandle>, ReadError> {
        if self.stream.is_none() {
            let pair = OutputStream::try_default()
                .map_err(|err| ReadError::Playback(format!("opening audio output: {err}")))?;
            self.stream = Some(pair);
        }
        let handle = self
            .stream
            .as_ref()
            .map(|(_, handle)| handle)
            .ok_or_else(|| ReadError::Playback("audio output unavailable".to_string()))?;

        let sink = Sink::try_new(handle)
            .map_err(|err| ReadError::Playback(format!("creating sink: {err}")))?;
        let source = Decoder::new(Cursor::new(clip))
            .map_err(|err| ReadError::Playback(format!("decoding clip: {err}")))?;
        sink.append(source);
        sink.play();
        Ok(Arc::new(SinkHandle { sink }))
    }

    fn release(&mut self) {
        if self.stream.take().is_some() {
            debug!("Released audio output stream");
        }
    }
}

struct SinkHandle {
    sink: Sink,
}

impl PlaybackHandle for SinkHandle {
    fn wait(&self) {
        self.sink.sleep_until_end();
    }

    fn stop(&self) {
        self.sink.stop();
    }
}
