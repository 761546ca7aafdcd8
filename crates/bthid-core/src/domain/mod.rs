//! Domain entities for the keyboard emulator.
//!
//! This module contains pure logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain**.  Domain code:
//!
//! - Contains the core rules of the application.
//! - Has **no** imports from OS APIs, sockets, or UI frameworks.
//! - Can be compiled and tested on any platform without Bluetooth hardware.
//!
//! Here that means: how a key combination becomes press/release events, how
//! those events change the keyboard's report, and what a Bluetooth address
//! looks like.  Opening sockets and sleeping between reports happen in the
//! outer layers of `bthid-typer`.

pub mod address;
pub mod keyboard;
pub mod sequence;
