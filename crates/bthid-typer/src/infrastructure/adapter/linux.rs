//! HCI device enumeration through the raw HCI socket.
//!
//! The kernel keeps a table of local adapters (`hci0`, `hci1`, ...).  Two
//! ioctls on an `AF_BLUETOOTH` / `BTPROTO_HCI` raw socket expose it:
//!
//! - `HCIGETDEVLIST` fills an array of `(dev_id, dev_opt)` pairs, where bit 0
//!   of `dev_opt` is the "device is up" flag.
//! - `HCIGETDEVINFO` returns the full `hci_dev_info` for one id, including
//!   the adapter's address.
//!
//! The resolver walks the list and returns the first up adapter whose address
//! equals the requested one.

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use bthid_core::BdAddr;
use tracing::debug;

use crate::application::register_service::{AdapterId, AdapterResolver, ResolveError};

const AF_BLUETOOTH: libc::c_int = 31;
const BTPROTO_HCI: libc::c_int = 1;

/// `_IOR('H', 210, int)`
const HCIGETDEVLIST: libc::c_ulong = 0x8004_48D2;
/// `_IOR('H', 211, int)`
const HCIGETDEVINFO: libc::c_ulong = 0x8004_48D3;

const HCI_MAX_DEV: usize = 16;
const HCI_UP: u32 = 1 << 0;

#[repr(C)]
#[derive(Clone, Copy, Default)]
struct HciDevReq {
    dev_id: u16,
    dev_opt: u32,
}

#[repr(C)]
struct HciDevListReq {
    dev_num: u16,
    dev_req: [HciDevReq; HCI_MAX_DEV],
}

#[repr(C)]
#[derive(Default)]
#[allow(dead_code)]
struct HciDevStats {
    err_rx: u32,
    err_tx: u32,
    cmd_tx: u32,
    evt_rx: u32,
    acl_tx: u32,
    acl_rx: u32,
    sco_tx: u32,
    sco_rx: u32,
    byte_rx: u32,
    byte_tx: u32,
}

/// `struct hci_dev_info` from `<bluetooth/hci.h>`.
#[repr(C)]
#[derive(Default)]
#[allow(dead_code)]
struct HciDevInfo {
    dev_id: u16,
    name: [u8; 8],
    bdaddr: [u8; 6],
    flags: u32,
    dev_type: u8,
    features: [u8; 8],
    pkt_type: u32,
    link_policy: u32,
    link_mode: u32,
    acl_mtu: u16,
    acl_pkts: u16,
    sco_mtu: u16,
    sco_pkts: u16,
    stat: HciDevStats,
}

/// Resolves adapter addresses by querying the kernel's HCI device table.
#[derive(Debug, Default, Clone, Copy)]
pub struct HciAdapterResolver;

impl HciAdapterResolver {
    fn open_socket() -> io::Result<OwnedFd> {
        // SAFETY: socket(2) takes no pointers; the result is checked below.
        let raw = unsafe {
            libc::socket(AF_BLUETOOTH, libc::SOCK_RAW | libc::SOCK_CLOEXEC, BTPROTO_HCI)
        };
        if raw < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `raw` is a freshly created descriptor owned by nobody else.
        Ok(unsafe { OwnedFd::from_raw_fd(raw) })
    }

    fn device_list(fd: &OwnedFd) -> io::Result<Vec<HciDevReq>> {
        let mut list = HciDevListReq {
            dev_num: HCI_MAX_DEV as u16,
            dev_req: [HciDevReq::default(); HCI_MAX_DEV],
        };
        // SAFETY: `list` is a live, correctly sized `hci_dev_list_req`.
        if unsafe { libc::ioctl(fd.as_raw_fd(), HCIGETDEVLIST as _, &mut list as *mut HciDevListReq) } < 0 {
            return Err(io::Error::last_os_error());
        }
        let n = usize::from(list.dev_num).min(HCI_MAX_DEV);
        Ok(list.dev_req[..n].to_vec())
    }

    fn device_address(fd: &OwnedFd, dev_id: u16) -> io::Result<BdAddr> {
        let mut info = HciDevInfo {
            dev_id,
            ..HciDevInfo::default()
        };
        // SAFETY: `info` is a live, correctly sized `hci_dev_info`.
        if unsafe { libc::ioctl(fd.as_raw_fd(), HCIGETDEVINFO as _, &mut info as *mut HciDevInfo) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(BdAddr::from_le_bytes(info.bdaddr))
    }
}

impl AdapterResolver for HciAdapterResolver {
    fn resolve(&self, source: BdAddr) -> Result<AdapterId, ResolveError> {
        let fd = Self::open_socket()?;

        for dev in Self::device_list(&fd)?.into_iter().filter(|d| d.dev_opt & HCI_UP != 0) {
            match Self::device_address(&fd, dev.dev_id) {
                Ok(addr) if addr == source => {
                    debug!(adapter = dev.dev_id, %addr, "matched local adapter");
                    return Ok(AdapterId(dev.dev_id));
                }
                Ok(_) => {}
                Err(e) => debug!(adapter = dev.dev_id, error = %e, "skipping adapter"),
            }
        }

        Err(ResolveError::NotFound(source))
    }
}
