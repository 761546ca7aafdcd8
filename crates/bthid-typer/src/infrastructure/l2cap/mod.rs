//! L2CAP transport implementations.
//!
//! The Linux implementation opens `AF_BLUETOOTH` / `SOCK_SEQPACKET` sockets
//! through `libc`.  Other platforms get a connector that always fails with
//! `Unsupported`, so the binary still builds and reports a clean error.
//!
//! A [`mock::MockConnector`] is provided for tests.

pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "linux")]
pub use linux::L2capConnector;

#[cfg(not(target_os = "linux"))]
pub use unsupported::L2capConnector;

#[cfg(not(target_os = "linux"))]
mod unsupported {
    use std::io;

    use bthid_core::BdAddr;

    use crate::application::type_text::{ChannelConnector, HidChannel, TransportError};

    /// Placeholder connector for platforms without BlueZ sockets.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct L2capConnector;

    impl ChannelConnector for L2capConnector {
        fn connect(
            &self,
            _source: BdAddr,
            target: BdAddr,
            psm: u16,
        ) -> Result<Box<dyn HidChannel>, TransportError> {
            Err(TransportError::Open {
                psm,
                target,
                source: io::Error::new(
                    io::ErrorKind::Unsupported,
                    "L2CAP sockets are only available on Linux",
                ),
            })
        }
    }
}
