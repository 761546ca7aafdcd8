//! Infrastructure layer for the typer.
//!
//! Contains OS-facing adapters for the traits declared in `application`.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `bthid_core`, but MUST NOT be imported by the `application` layer outside
//! of tests.
//!
//! # Sub-modules
//!
//! - **`adapter`** – Resolves a local Bluetooth address to an HCI adapter
//!   index via the kernel's HCI device ioctls.
//!
//! - **`l2cap`** – Opens L2CAP `SOCK_SEQPACKET` channels to the host.  A
//!   `MockConnector` records traffic for tests.
//!
//! - **`pacer`** – Real and recording implementations of the `Pacer` clock.
//!
//! - **`sdp`** – Registers the HID keyboard record with the local SDP server
//!   over its Unix socket.
//!
//! - **`storage`** – TOML configuration file.

pub mod adapter;
pub mod l2cap;
pub mod pacer;
pub mod sdp;
pub mod storage;
