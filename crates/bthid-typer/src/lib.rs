//! bthid-typer library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does bthid-typer do? (for beginners)
//!
//! bthid-typer makes a Linux machine with a Bluetooth adapter pretend to be
//! a Bluetooth keyboard, then "types" a piece of text into a host (a PC,
//! phone or tablet) that has previously been paired with it.
//!
//! A run:
//!
//! 1. Publishes a HID keyboard record with the local SDP server, so the host
//!    recognises the device as a keyboard.
//! 2. Opens the HID control and interrupt L2CAP channels to the host and
//!    performs a short handshake on the control channel.
//! 3. Types a few throw-away keystrokes to wake the host up, then the text
//!    itself, one 10-byte input report at a time, 200 ms apart.
//! 4. Closes the channels and removes the SDP record.
//!
//! Key tables and the report format live in `bthid_core`; this crate owns
//! the session logic and the OS-facing pieces.

/// Application layer: use cases for a typing run.
pub mod application;

/// Infrastructure layer: Bluetooth sockets, SDP, clock, and config storage.
pub mod infrastructure;
