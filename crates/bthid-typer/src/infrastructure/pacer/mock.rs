//! Recording pacer for unit and integration testing.
//!
//! Sessions sleep for a full second after the handshake and 200 ms before
//! every report.  The `RecordingPacer` returns immediately and keeps the
//! requested durations in order, so tests can assert on the exact pacing
//! without waiting for it.

use std::sync::Mutex;
use std::time::Duration;

use crate::application::type_text::Pacer;

/// A pacer that records every requested sleep without sleeping.
#[derive(Default)]
pub struct RecordingPacer {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    /// Creates a new `RecordingPacer` with an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded sleeps, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    /// Returns the sum of all recorded sleeps.
    pub fn total(&self) -> Duration {
        self.sleeps.lock().unwrap().iter().sum()
    }
}

impl Pacer for RecordingPacer {
    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
