//! Application layer use cases for the typer.
//!
//! # What use cases does the typer have?
//!
//! - **`type_text`** – Runs one typing session: turns a text payload into
//!   keyboard reports and streams them to the host over the HID interrupt
//!   channel, opening the channels and performing the handshake on the first
//!   report.  The transport and the clock are injected as traits so the
//!   whole session can be driven by mocks in tests.
//!
//! - **`register_service`** – Wraps a session with the keyboard's SDP record:
//!   resolves the local adapter, publishes the record, and removes it again
//!   once the session has finished.

pub mod register_service;
pub mod type_text;
