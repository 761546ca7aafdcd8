//! Use case: keep the HID keyboard service advertised for the length of a run.
//!
//! Before a host will talk to a Bluetooth keyboard it looks up the keyboard's
//! SDP record.  This use case wraps a typing session with the record's
//! lifecycle:
//!
//! 1. Resolve the configured source address to a local adapter.
//! 2. If an adapter was found, register the keyboard record.
//! 3. Run the session.
//! 4. If an adapter was found, remove the record again.
//!
//! Neither resolution nor registration failures stop the session: they are
//! logged and the run carries on, because an already-paired host can still
//! accept the connection.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use bthid_core::protocol::sdp::{SdpError, ServiceInfo};
use bthid_core::BdAddr;
use thiserror::Error;
use tracing::{info, warn};

/// Index of a local Bluetooth adapter (`hci0`, `hci1`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdapterId(pub u16);

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hci{}", self.0)
    }
}

/// Errors from resolving a source address to an adapter.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no powered-up adapter with address {0}")]
    NotFound(BdAddr),

    #[error("HCI query failed: {0}")]
    Io(#[from] io::Error),
}

/// Errors from talking to the local SDP server.
#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("cannot connect to SDP server at {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("SDP server I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SDP protocol error: {0}")]
    Protocol(#[from] SdpError),
}

/// Maps a local adapter address to its adapter index.
#[cfg_attr(test, mockall::automock)]
pub trait AdapterResolver: Send + Sync {
    /// Returns the adapter whose address is `source`.
    ///
    /// Only adapters that are powered up are considered.
    fn resolve(&self, source: BdAddr) -> Result<AdapterId, ResolveError>;
}

/// Publishes and withdraws the keyboard's SDP record.
#[cfg_attr(test, mockall::automock)]
pub trait ServiceRegistrar: Send + Sync {
    fn register_keyboard_service(&self, info: &ServiceInfo) -> Result<(), RegistrarError>;

    /// Removes the record.  A no-op if nothing is registered.
    fn unregister_keyboard_service(&self) -> Result<(), RegistrarError>;
}

/// Wraps a typing session with adapter resolution and SDP registration.
pub struct KeyboardServiceUseCase {
    resolver: Arc<dyn AdapterResolver>,
    registrar: Arc<dyn ServiceRegistrar>,
    info: ServiceInfo,
}

impl KeyboardServiceUseCase {
    pub fn new(
        resolver: Arc<dyn AdapterResolver>,
        registrar: Arc<dyn ServiceRegistrar>,
        info: ServiceInfo,
    ) -> Self {
        Self {
            resolver,
            registrar,
            info,
        }
    }

    /// Resolves `source` to an adapter.  `ANY` means adapter 0.
    ///
    /// Failures are logged and reported as `None`.
    pub fn resolve_adapter(&self, source: BdAddr) -> Option<AdapterId> {
        if source.is_any() {
            return Some(AdapterId(0));
        }
        match self.resolver.resolve(source) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(%source, error = %e, "could not resolve local adapter");
                None
            }
        }
    }

    /// Runs `session` with the keyboard service registered around it.
    ///
    /// The session always runs; its return value is passed through.
    pub fn run<T>(&self, source: BdAddr, session: impl FnOnce() -> T) -> T {
        let adapter = self.resolve_adapter(source);

        if let Some(id) = adapter {
            match self.registrar.register_keyboard_service(&self.info) {
                Ok(()) => info!(adapter = %id, name = %self.info.name, "keyboard service registered"),
                Err(e) => warn!(adapter = %id, error = %e, "keyboard service registration failed"),
            }
        }

        let result = session();

        if let Some(id) = adapter {
            if let Err(e) = self.registrar.unregister_keyboard_service() {
                warn!(adapter = %id, error = %e, "keyboard service removal failed");
            }
        }

        result
    }
}
