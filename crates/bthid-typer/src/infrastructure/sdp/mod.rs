//! Client for the local SDP server's Unix socket.
//!
//! # How does registration work? (for beginners)
//!
//! BlueZ runs an SDP server that answers hosts asking "what services does
//! this device offer?".  Local programs add records to it by connecting to
//! its Unix socket (`/var/run/sdp`) and sending BlueZ-private PDUs:
//!
//! ```text
//! client                              sdpd
//!   | -- SVC_REGISTER_REQ (record) -->  |
//!   | <-- SVC_REGISTER_RSP (handle) --  |
//!   |          ... session ...          |
//!   | -- SVC_REMOVE_REQ (handle) ---->  |
//!   | <-- SVC_REMOVE_RSP (status) ----  |
//! ```
//!
//! The server drops every record owned by a connection when that connection
//! closes, so the stream is held open for as long as the record should stay
//! published.

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Mutex;

use bthid_core::protocol::sdp::{
    hid_keyboard_record, parse_register_response, parse_remove_response, register_request,
    remove_request, ServiceInfo, PDU_HEADER_SIZE,
};
use bthid_core::BdAddr;
use tracing::{debug, warn};

use crate::application::register_service::{RegistrarError, ServiceRegistrar};

/// Default location of the SDP server socket.
pub const DEFAULT_SDP_SOCKET: &str = "/var/run/sdp";

struct Registration {
    stream: UnixStream,
    handle: u32,
}

/// Registers the keyboard record with the SDP server over its Unix socket.
pub struct SdpRegistrar {
    path: PathBuf,
    device: BdAddr,
    registration: Mutex<Option<Registration>>,
    next_tid: AtomicU16,
}

impl SdpRegistrar {
    /// Creates a registrar publishing on `device` (`ANY` for every adapter).
    pub fn new(path: impl Into<PathBuf>, device: BdAddr) -> Self {
        Self {
            path: path.into(),
            device,
            registration: Mutex::new(None),
            next_tid: AtomicU16::new(1),
        }
    }

    /// Returns the handle of the currently published record, if any.
    pub fn handle(&self) -> Option<u32> {
        self.registration
            .lock()
            .ok()
            .and_then(|r| r.as_ref().map(|reg| reg.handle))
    }

    fn transaction_id(&self) -> u16 {
        self.next_tid.fetch_add(1, Ordering::Relaxed)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Registration>>, RegistrarError> {
        self.registration
            .lock()
            .map_err(|_| std::io::Error::other("SDP registration lock poisoned").into())
    }
}

/// Sends one request and reads back one complete response PDU.
fn transact(stream: &mut UnixStream, request: &[u8]) -> Result<Vec<u8>, RegistrarError> {
    stream.write_all(request)?;

    let mut response = vec![0u8; PDU_HEADER_SIZE];
    stream.read_exact(&mut response)?;
    let plen = u16::from_be_bytes([response[3], response[4]]) as usize;
    response.resize(PDU_HEADER_SIZE + plen, 0);
    stream.read_exact(&mut response[PDU_HEADER_SIZE..])?;
    Ok(response)
}

impl ServiceRegistrar for SdpRegistrar {
    fn register_keyboard_service(&self, info: &ServiceInfo) -> Result<(), RegistrarError> {
        let mut slot = self.lock()?;
        if let Some(old) = slot.as_ref() {
            warn!(handle = old.handle, "replacing previously registered keyboard record");
        }

        let mut stream = UnixStream::connect(&self.path).map_err(|source| RegistrarError::Connect {
            path: self.path.clone(),
            source,
        })?;

        let tid = self.transaction_id();
        let request = register_request(tid, self.device, &hid_keyboard_record(info))?;
        let response = transact(&mut stream, &request)?;
        let handle = parse_register_response(&response, tid)?;

        debug!(handle = format_args!("0x{handle:08X}"), "SDP record registered");
        *slot = Some(Registration { stream, handle });
        Ok(())
    }

    fn unregister_keyboard_service(&self) -> Result<(), RegistrarError> {
        let Some(mut reg) = self.lock()?.take() else {
            return Ok(());
        };

        let tid = self.transaction_id();
        let response = transact(&mut reg.stream, &remove_request(tid, reg.handle))?;
        parse_remove_response(&response, tid)?;

        debug!(handle = format_args!("0x{:08X}", reg.handle), "SDP record removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bthid_core::protocol::sdp::{SdpError, SDP_SVC_REGISTER_REQ, SDP_SVC_REMOVE_REQ};
    use std::os::unix::net::UnixListener;
    use std::thread;

    fn info() -> ServiceInfo {
        ServiceInfo {
            name: "Bluetooth Keyboard".to_string(),
            description: "Virtual keyboard".to_string(),
            provider: "bthid-typer".to_string(),
        }
    }

    fn socket_path() -> PathBuf {
        std::env::temp_dir().join(format!("bthid_sdp_{}.sock", uuid::Uuid::new_v4()))
    }

    /// Reads one PDU, or `None` once the client has hung up.
    fn read_pdu(stream: &mut UnixStream) -> Option<Vec<u8>> {
        let mut pdu = vec![0u8; PDU_HEADER_SIZE];
        stream.read_exact(&mut pdu).ok()?;
        let plen = u16::from_be_bytes([pdu[3], pdu[4]]) as usize;
        pdu.resize(PDU_HEADER_SIZE + plen, 0);
        stream.read_exact(&mut pdu[PDU_HEADER_SIZE..]).ok()?;
        Some(pdu)
    }

    /// Accepts one connection and answers register and remove requests.
    /// Returns the PDU ids it received.
    fn fake_server(listener: UnixListener, handle: u32, remove_status: u16) -> thread::JoinHandle<Vec<u8>> {
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut seen = Vec::new();
            while let Some(req) = read_pdu(&mut stream) {
                seen.push(req[0]);
                let (id, params) = match req[0] {
                    SDP_SVC_REGISTER_REQ => (0x76, handle.to_be_bytes().to_vec()),
                    _ => (0x80, remove_status.to_be_bytes().to_vec()),
                };
                let mut rsp = vec![id, req[1], req[2]];
                rsp.extend_from_slice(&(params.len() as u16).to_be_bytes());
                rsp.extend_from_slice(&params);
                stream.write_all(&rsp).unwrap();
            }
            seen
        })
    }

    #[test]
    fn test_register_then_unregister_round_trip() {
        // Arrange
        let path = socket_path();
        let server = fake_server(UnixListener::bind(&path).unwrap(), 0x0001_0005, 0);
        let registrar = SdpRegistrar::new(&path, BdAddr::ANY);

        // Act
        registrar.register_keyboard_service(&info()).unwrap();
        let handle = registrar.handle();
        registrar.unregister_keyboard_service().unwrap();

        // Assert
        assert_eq!(handle, Some(0x0001_0005));
        assert_eq!(registrar.handle(), None);
        assert_eq!(server.join().unwrap(), vec![SDP_SVC_REGISTER_REQ, SDP_SVC_REMOVE_REQ]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unregister_without_registration_is_a_no_op() {
        let registrar = SdpRegistrar::new(socket_path(), BdAddr::ANY);

        assert!(registrar.unregister_keyboard_service().is_ok());
    }

    #[test]
    fn test_register_fails_with_connect_error_when_no_server() {
        // Arrange
        let path = socket_path();
        let registrar = SdpRegistrar::new(&path, BdAddr::ANY);

        // Act
        let err = registrar.register_keyboard_service(&info()).unwrap_err();

        // Assert
        assert!(matches!(err, RegistrarError::Connect { path: p, .. } if p == path));
        assert_eq!(registrar.handle(), None);
    }

    #[test]
    fn test_remove_with_non_zero_status_is_protocol_error() {
        // Arrange
        let path = socket_path();
        let server = fake_server(UnixListener::bind(&path).unwrap(), 7, 0x0002);
        let registrar = SdpRegistrar::new(&path, BdAddr::ANY);
        registrar.register_keyboard_service(&info()).unwrap();

        // Act
        let err = registrar.unregister_keyboard_service().unwrap_err();

        // Assert
        assert!(matches!(err, RegistrarError::Protocol(SdpError::ServerError(2))));
        drop(registrar);
        server.join().unwrap();
        let _ = std::fs::remove_file(&path);
    }
}
