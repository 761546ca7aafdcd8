//! # bthid-core
//!
//! Shared library for the Bluetooth HID keyboard typer containing the key
//! translation tables, the keyboard state machine, and the HIDP/SDP wire
//! formats.
//!
//! It has zero dependencies on OS APIs or sockets.
//!
//! # Architecture overview (for beginners)
//!
//! The typer pretends to be a Bluetooth keyboard and "types" a text payload
//! into a paired host.  Every character goes through the same pipeline:
//!
//! ```text
//! char ──translate──► KeyCombination ──sequence──► KeyEvent × 2..4
//!      ──KeyboardState::apply──► 10-byte report ──► interrupt channel
//! ```
//!
//! - **`keymap`** – Tables mapping ASCII characters to Linux key codes and
//!   Linux key codes to USB HID usage IDs.
//!
//! - **`domain`** – The event sequencer, the 6-key rollover state machine, and
//!   the Bluetooth device address type.
//!
//! - **`protocol`** – The byte layout of the input report, the L2CAP channel
//!   numbers and handshake, and the SDP record that advertises the keyboard.

pub mod domain;
pub mod keymap;
pub mod protocol;

pub use domain::address::{AddressParseError, BdAddr};
pub use domain::keyboard::KeyboardState;
pub use domain::sequence::{sequence, KeyEvent, SequenceError, MAX_EVENTS_PER_COMBINATION};
pub use keymap::hid::HidKeyCode;
pub use keymap::{translate, KeyCombination, LinuxKey, Shift, TranslateError};
pub use protocol::report::{InputReport, REPORT_LEN};
