//! TypeTextUseCase: types a text payload into a remote host over Bluetooth HID.
//!
//! This use case owns one typing session from start to finish.  It turns the
//! payload into keyboard reports with `bthid_core`, opens the two L2CAP
//! channels lazily on the first report, performs the control-channel
//! handshake, paces the reports, and releases the channels on every exit
//! path.  The actual sockets and sleeps are provided through the
//! [`ChannelConnector`] and [`Pacer`] traits so the whole session can be
//! driven in-memory by tests.
//!
//! # Session states (for beginners)
//!
//! ```text
//! Idle ─► Connecting ─► Handshaking ─► Streaming ─► Closed
//!   │          │              │             │
//!   └──────────┴──────────────┴─────────────┴──► Aborted
//! ```
//!
//! Nothing touches the radio until the first report is ready; a payload that
//! produces no reports never connects at all.  Every I/O error is terminal:
//! there are no retries.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use bthid_core::{
    protocol::report::{hex_dump, HANDSHAKE_MESSAGES, PSM_HID_CONTROL, PSM_HID_INTERRUPT},
    sequence, translate, BdAddr, KeyEvent, KeyboardState, LinuxKey, MAX_EVENTS_PER_COMBINATION,
};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Pause after the handshake; some hosts drop the first report without it.
pub const HANDSHAKE_PAUSE: Duration = Duration::from_secs(1);

/// Delay before every report except the first one of a session.
pub const REPORT_INTERVAL: Duration = Duration::from_millis(200);

/// Number of escape characters typed before the payload by default.
pub const DEFAULT_PREAMBLE_LEN: usize = 10;

/// The preamble character.  It translates to Backspace on the host.
const PREAMBLE_CHAR: char = '\u{1b}';

// ── Transport seam ────────────────────────────────────────────────────────────

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The channel could not be opened.
    #[error("failed to open L2CAP channel PSM 0x{psm:04X} to {target}: {source}")]
    Open {
        psm: u16,
        target: BdAddr,
        #[source]
        source: io::Error,
    },

    /// A write on an open channel failed.
    #[error("channel write failed: {0}")]
    Io(#[from] io::Error),

    /// A write was accepted only partially.
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
}

/// One open L2CAP channel to the host.
///
/// Dropping the channel closes it.
pub trait HidChannel: Send {
    /// Writes one packet and returns the number of bytes accepted.
    fn send(&mut self, packet: &[u8]) -> Result<usize, TransportError>;
}

/// Opens L2CAP channels to a remote host.
pub trait ChannelConnector: Send + Sync {
    /// Opens a channel from `source` (ANY for the default adapter) to
    /// `target` on the given PSM.
    fn connect(
        &self,
        source: BdAddr,
        target: BdAddr,
        psm: u16,
    ) -> Result<Box<dyn HidChannel>, TransportError>;
}

/// Blocks the session for a fixed duration.
pub trait Pacer: Send + Sync {
    fn sleep(&self, duration: Duration);
}

// ── Session types ─────────────────────────────────────────────────────────────

/// Lifecycle state of a typing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Handshaking,
    Streaming,
    Closed,
    Aborted,
}

/// Fatal conditions that end a session early.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A report was ready but no host address was configured.
    #[error("no target host configured")]
    TargetUnset,

    /// The control or interrupt channel could not be opened.
    #[error("could not open channel: {0}")]
    ChannelOpen(#[source] TransportError),

    /// The handshake messages could not be delivered.
    #[error("handshake failed: {0}")]
    Handshake(#[source] TransportError),

    /// A report could not be delivered.
    #[error("report transmission failed: {0}")]
    Transmission(#[source] TransportError),
}

/// Settings for one typing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Local adapter address, or [`BdAddr::ANY`].
    pub source: BdAddr,
    /// Host to type into.  `None` aborts the session at the first report.
    pub target: Option<BdAddr>,
    /// Number of escape characters typed before the payload.
    pub preamble_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            source: BdAddr::ANY,
            target: None,
            preamble_len: DEFAULT_PREAMBLE_LEN,
        }
    }
}

/// Summary of a finished session.
#[derive(Debug)]
pub struct SessionOutcome {
    /// Terminal state: [`SessionState::Closed`] or [`SessionState::Aborted`].
    pub state: SessionState,
    /// Reports successfully written to the interrupt channel.
    pub reports_sent: usize,
    /// Characters skipped because they cannot be typed.
    pub chars_skipped: usize,
    /// The fatal error, when the session was aborted.
    pub error: Option<SessionError>,
}

impl SessionOutcome {
    pub fn is_aborted(&self) -> bool {
        self.state == SessionState::Aborted
    }
}

/// Mutable state of the session in progress.
struct Session {
    state: SessionState,
    keyboard: KeyboardState,
    control: Option<Box<dyn HidChannel>>,
    interrupt: Option<Box<dyn HidChannel>>,
    reports_sent: usize,
    chars_skipped: usize,
}

impl Session {
    fn new() -> Self {
        Self {
            state: SessionState::Idle,
            keyboard: KeyboardState::new(),
            control: None,
            interrupt: None,
            reports_sent: 0,
            chars_skipped: 0,
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "session state");
        self.state = next;
    }

    /// Drops every open channel, control first.
    fn release_channels(&mut self) {
        if self.control.take().is_some() {
            debug!("control channel closed");
        }
        if self.interrupt.take().is_some() {
            debug!("interrupt channel closed");
        }
    }
}

/// Writes the whole packet in one call or fails.
fn send_packet(channel: &mut dyn HidChannel, packet: &[u8]) -> Result<(), TransportError> {
    let written = channel.send(packet)?;
    if written != packet.len() {
        return Err(TransportError::ShortWrite {
            written,
            expected: packet.len(),
        });
    }
    Ok(())
}

// ── Use case ──────────────────────────────────────────────────────────────────

/// The Type Text use case.
pub struct TypeTextUseCase {
    connector: Arc<dyn ChannelConnector>,
    pacer: Arc<dyn Pacer>,
    config: SessionConfig,
}

impl TypeTextUseCase {
    /// Creates a new use case with the given transport and pacer.
    pub fn new(
        connector: Arc<dyn ChannelConnector>,
        pacer: Arc<dyn Pacer>,
        config: SessionConfig,
    ) -> Self {
        Self {
            connector,
            pacer,
            config,
        }
    }

    /// Types the preamble, `payload` and a final newline.
    ///
    /// Never panics and never returns early without releasing the channels;
    /// failures are reported in the returned [`SessionOutcome`].
    pub fn run(&self, payload: &str) -> SessionOutcome {
        let mut session = Session::new();

        let stream = std::iter::repeat(PREAMBLE_CHAR)
            .take(self.config.preamble_len)
            .chain(payload.chars())
            .chain(std::iter::once('\n'));

        let result = self.type_chars(&mut session, stream);
        session.release_channels();

        let error = match result {
            Ok(()) => {
                session.transition(SessionState::Closed);
                info!(
                    reports = session.reports_sent,
                    skipped = session.chars_skipped,
                    "session finished"
                );
                None
            }
            Err(e) => {
                session.transition(SessionState::Aborted);
                warn!(reports = session.reports_sent, "session aborted: {e}");
                Some(e)
            }
        };

        SessionOutcome {
            state: session.state,
            reports_sent: session.reports_sent,
            chars_skipped: session.chars_skipped,
            error,
        }
    }

    fn type_chars(
        &self,
        session: &mut Session,
        chars: impl Iterator<Item = char>,
    ) -> Result<(), SessionError> {
        let mut events = [KeyEvent::release(LinuxKey(0)); MAX_EVENTS_PER_COMBINATION];

        for c in chars {
            let combo = match translate(c) {
                Ok(combo) => combo,
                Err(e) => {
                    debug!("skipping character: {e}");
                    session.chars_skipped += 1;
                    continue;
                }
            };
            let len = match sequence(&combo, &mut events) {
                Ok(len) => len,
                Err(e) => {
                    debug!("skipping character {c:?}: {e}");
                    session.chars_skipped += 1;
                    continue;
                }
            };

            for &event in &events[..len] {
                if session.keyboard.apply(event) {
                    self.transmit(session)?;
                }
            }
        }
        Ok(())
    }

    /// Sends the current report, establishing the transport first if needed.
    fn transmit(&self, session: &mut Session) -> Result<(), SessionError> {
        if session.interrupt.is_none() {
            self.establish(session)?;
        }

        if session.reports_sent > 0 {
            self.pacer.sleep(REPORT_INTERVAL);
        }

        let report = session.keyboard.snapshot();
        trace!(
            report = %hex_dump(&report),
            keys = ?session.keyboard.report().pressed_keys().collect::<Vec<_>>(),
            "sending report"
        );

        let interrupt = session
            .interrupt
            .as_deref_mut()
            .ok_or_else(|| {
                SessionError::Transmission(TransportError::Io(io::ErrorKind::NotConnected.into()))
            })?;
        send_packet(interrupt, &report).map_err(SessionError::Transmission)?;
        session.reports_sent += 1;
        Ok(())
    }

    /// Opens both channels and performs the handshake.
    fn establish(&self, session: &mut Session) -> Result<(), SessionError> {
        let target = self.config.target.ok_or(SessionError::TargetUnset)?;
        let source = self.config.source;

        session.transition(SessionState::Connecting);
        info!(%source, %target, "connecting to host");

        let control = self
            .connector
            .connect(source, target, PSM_HID_CONTROL)
            .map_err(SessionError::ChannelOpen)?;
        session.control = Some(control);
        debug!("control channel open");

        // On failure the control channel is released by the caller.
        let interrupt = self
            .connector
            .connect(source, target, PSM_HID_INTERRUPT)
            .map_err(SessionError::ChannelOpen)?;
        session.interrupt = Some(interrupt);
        debug!("interrupt channel open");

        session.transition(SessionState::Handshaking);
        if let Some(control) = session.control.as_deref_mut() {
            for message in &HANDSHAKE_MESSAGES {
                send_packet(control, message).map_err(SessionError::Handshake)?;
            }
        }
        self.pacer.sleep(HANDSHAKE_PAUSE);

        session.transition(SessionState::Streaming);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::l2cap::mock::MockConnector;
    use crate::infrastructure::pacer::mock::RecordingPacer;

    fn target() -> BdAddr {
        BdAddr::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF])
    }

    fn use_case(
        connector: &Arc<MockConnector>,
        pacer: &Arc<RecordingPacer>,
        target: Option<BdAddr>,
        preamble_len: usize,
    ) -> TypeTextUseCase {
        TypeTextUseCase::new(
            Arc::clone(connector) as Arc<dyn ChannelConnector>,
            Arc::clone(pacer) as Arc<dyn Pacer>,
            SessionConfig {
                source: BdAddr::ANY,
                target,
                preamble_len,
            },
        )
    }

    #[test]
    fn test_session_closes_after_typing_payload() {
        // Arrange
        let connector = Arc::new(MockConnector::new());
        let pacer = Arc::new(RecordingPacer::new());
        let uc = use_case(&connector, &pacer, Some(target()), 0);

        // Act
        let outcome = uc.run("ab");

        // Assert: a, b and Enter each produce press + release
        assert_eq!(outcome.state, SessionState::Closed);
        assert_eq!(outcome.reports_sent, 6);
        assert!(outcome.error.is_none());
        assert_eq!(connector.interrupt_writes().len(), 6);
        assert_eq!(connector.closed_psms(), vec![PSM_HID_CONTROL, PSM_HID_INTERRUPT]);
    }

    #[test]
    fn test_handshake_precedes_first_report() {
        let connector = Arc::new(MockConnector::new());
        let pacer = Arc::new(RecordingPacer::new());
        let uc = use_case(&connector, &pacer, Some(target()), 0);

        uc.run("");

        assert_eq!(
            connector.control_writes(),
            vec![vec![0xA1, 0x13, 0x03], vec![0xA1, 0x13, 0x02]]
        );
        assert_eq!(pacer.sleeps()[0], HANDSHAKE_PAUSE);
    }

    #[test]
    fn test_reports_are_paced_except_the_first() {
        // Arrange
        let connector = Arc::new(MockConnector::new());
        let pacer = Arc::new(RecordingPacer::new());
        let uc = use_case(&connector, &pacer, Some(target()), 0);

        // Act
        let outcome = uc.run("x");

        // Assert
        let mut expected = vec![HANDSHAKE_PAUSE];
        expected.extend(std::iter::repeat(REPORT_INTERVAL).take(outcome.reports_sent - 1));
        assert_eq!(pacer.sleeps(), expected);
    }

    #[test]
    fn test_missing_target_aborts_without_opening_channels() {
        let connector = Arc::new(MockConnector::new());
        let pacer = Arc::new(RecordingPacer::new());
        let uc = use_case(&connector, &pacer, None, 10);

        let outcome = uc.run("hello");

        assert!(outcome.is_aborted());
        assert!(matches!(outcome.error, Some(SessionError::TargetUnset)));
        assert_eq!(outcome.reports_sent, 0);
        assert!(connector.connect_attempts().is_empty());
        assert!(pacer.sleeps().is_empty());
    }

    #[test]
    fn test_untranslatable_chars_are_counted_and_skipped() {
        let connector = Arc::new(MockConnector::new());
        let pacer = Arc::new(RecordingPacer::new());
        let uc = use_case(&connector, &pacer, Some(target()), 0);

        let outcome = uc.run("a\tb\u{7f}é");

        assert_eq!(outcome.state, SessionState::Closed);
        assert_eq!(outcome.chars_skipped, 3);
        assert_eq!(outcome.reports_sent, 6);
    }

    #[test]
    fn test_short_report_write_aborts_session() {
        // Arrange
        let connector = Arc::new(MockConnector::new());
        connector.set_write_limit(PSM_HID_INTERRUPT, Some(4));
        let pacer = Arc::new(RecordingPacer::new());
        let uc = use_case(&connector, &pacer, Some(target()), 0);

        // Act
        let outcome = uc.run("abc");

        // Assert
        assert!(outcome.is_aborted());
        assert!(matches!(
            outcome.error,
            Some(SessionError::Transmission(TransportError::ShortWrite { written: 4, expected: 10 }))
        ));
        assert_eq!(outcome.reports_sent, 0);
        assert_eq!(connector.closed_psms().len(), 2);
    }

    #[test]
    fn test_send_packet_accepts_full_write() {
        struct Sink;
        impl HidChannel for Sink {
            fn send(&mut self, packet: &[u8]) -> Result<usize, TransportError> {
                Ok(packet.len())
            }
        }

        assert!(send_packet(&mut Sink, &[1, 2, 3]).is_ok());
    }
}
