//! Linux L2CAP sockets via the BlueZ kernel socket API.
//!
//! # What is an L2CAP channel? (for beginners)
//!
//! L2CAP is the Bluetooth layer that multiplexes connections over one radio
//! link, a bit like TCP ports over IP.  The multiplexing number is called a
//! PSM.  A Bluetooth HID keyboard uses two channels to the host:
//!
//! | PSM    | Channel   | Carries                               |
//! |--------|-----------|---------------------------------------|
//! | 0x0011 | control   | handshake and control requests        |
//! | 0x0013 | interrupt | input reports (the actual keystrokes) |
//!
//! Linux exposes L2CAP as ordinary sockets:
//! ```text
//! socket(AF_BLUETOOTH, SOCK_SEQPACKET, BTPROTO_L2CAP)
//! bind(local adapter address, psm 0)
//! connect(host address, psm)
//! ```
//! `SOCK_SEQPACKET` keeps packet boundaries, so one `write` is one HIDP
//! frame on the air.
//!
//! # Permissions
//!
//! Connecting usually requires `CAP_NET_RAW` or root, and the host must
//! already be paired with the local adapter.

use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use bthid_core::BdAddr;
use tracing::debug;

use crate::application::type_text::{ChannelConnector, HidChannel, TransportError};

// ── BlueZ constants ───────────────────────────────────────────────────────────

/// `AF_BLUETOOTH` address family.
const AF_BLUETOOTH: libc::c_int = 31;

/// `BTPROTO_L2CAP` protocol number.
const BTPROTO_L2CAP: libc::c_int = 0;

/// `BDADDR_BREDR`: classic (BR/EDR) address type.
const BDADDR_BREDR: u8 = 0x00;

/// `struct sockaddr_l2` from `<bluetooth/l2cap.h>`.
///
/// Multi-byte fields are little-endian; the address is stored reversed.
#[repr(C)]
struct SockaddrL2 {
    l2_family: libc::sa_family_t,
    l2_psm: u16,
    l2_bdaddr: [u8; 6],
    l2_cid: u16,
    l2_bdaddr_type: u8,
}

impl SockaddrL2 {
    fn new(addr: BdAddr, psm: u16) -> Self {
        Self {
            l2_family: AF_BLUETOOTH as libc::sa_family_t,
            l2_psm: psm.to_le(),
            l2_bdaddr: addr.to_le_bytes(),
            l2_cid: 0,
            l2_bdaddr_type: BDADDR_BREDR,
        }
    }

    fn as_sockaddr(&self) -> (*const libc::sockaddr, libc::socklen_t) {
        (
            (self as *const Self).cast(),
            mem::size_of::<Self>() as libc::socklen_t,
        )
    }
}

// ── Connector ─────────────────────────────────────────────────────────────────

/// Opens real L2CAP channels through the kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct L2capConnector;

impl ChannelConnector for L2capConnector {
    fn connect(
        &self,
        source: BdAddr,
        target: BdAddr,
        psm: u16,
    ) -> Result<Box<dyn HidChannel>, TransportError> {
        let channel = L2capChannel::open(source, target, psm).map_err(|e| TransportError::Open {
            psm,
            target,
            source: e,
        })?;
        debug!(psm = format_args!("0x{psm:04X}"), %target, "L2CAP channel connected");
        Ok(Box::new(channel))
    }
}

/// One connected L2CAP socket.  The descriptor is closed on drop.
pub struct L2capChannel {
    fd: OwnedFd,
    psm: u16,
}

impl L2capChannel {
    fn open(source: BdAddr, target: BdAddr, psm: u16) -> io::Result<Self> {
        // SAFETY: socket(2) takes no pointers; the result is checked below.
        let raw = unsafe {
            libc::socket(
                AF_BLUETOOTH,
                libc::SOCK_SEQPACKET | libc::SOCK_CLOEXEC,
                BTPROTO_L2CAP,
            )
        };
        if raw < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `raw` is a freshly created descriptor owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        let local = SockaddrL2::new(source, 0);
        let (addr, len) = local.as_sockaddr();
        // SAFETY: `addr` points to a live `SockaddrL2` of `len` bytes.
        if unsafe { libc::bind(fd.as_raw_fd(), addr, len) } < 0 {
            return Err(io::Error::last_os_error());
        }

        let remote = SockaddrL2::new(target, psm);
        let (addr, len) = remote.as_sockaddr();
        // SAFETY: as above; connect(2) blocks with the kernel's default timeout.
        if unsafe { libc::connect(fd.as_raw_fd(), addr, len) } < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self { fd, psm })
    }
}

impl HidChannel for L2capChannel {
    fn send(&mut self, packet: &[u8]) -> Result<usize, TransportError> {
        // SAFETY: the pointer and length describe the borrowed `packet` slice.
        let n = unsafe { libc::write(self.fd.as_raw_fd(), packet.as_ptr().cast(), packet.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error().into());
        }
        Ok(n as usize)
    }
}

impl Drop for L2capChannel {
    fn drop(&mut self) {
        debug!(psm = format_args!("0x{:04X}", self.psm), "closing L2CAP channel");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sockaddr_stores_psm_and_address_little_endian() {
        // Arrange
        let addr = BdAddr::new([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);

        // Act
        let sa = SockaddrL2::new(addr, 0x0013);

        // Assert
        assert_eq!(sa.l2_family, AF_BLUETOOTH as libc::sa_family_t);
        assert_eq!(u16::from_le(sa.l2_psm), 0x0013);
        assert_eq!(sa.l2_bdaddr, [0x66, 0x55, 0x44, 0x33, 0x22, 0x11]);
        assert_eq!(sa.l2_cid, 0);
    }

    #[test]
    fn test_sockaddr_size_matches_kernel_layout() {
        // 2 + 2 + 6 + 2 + 1, padded to the 2-byte alignment
        assert_eq!(mem::size_of::<SockaddrL2>(), 14);
    }
}
