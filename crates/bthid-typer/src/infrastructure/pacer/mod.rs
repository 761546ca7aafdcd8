//! Pacer implementations.
//!
//! The session sleeps once after the handshake and once before every report
//! but the first.  [`ThreadPacer`] performs those sleeps for real; the
//! [`mock::RecordingPacer`] only records them.

pub mod mock;

use std::time::Duration;

use crate::application::type_text::Pacer;

/// Sleeps on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
