//! Local Bluetooth adapter lookup.
//!
//! On Linux, [`HciAdapterResolver`] asks the kernel for the list of HCI
//! devices and picks the powered-up one whose address matches.  Other
//! platforms get a resolver that always fails; the session still runs.

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "linux")]
pub use linux::HciAdapterResolver;

#[cfg(not(target_os = "linux"))]
pub use unsupported::HciAdapterResolver;

#[cfg(not(target_os = "linux"))]
mod unsupported {
    use std::io;

    use bthid_core::BdAddr;

    use crate::application::register_service::{AdapterId, AdapterResolver, ResolveError};

    #[derive(Debug, Default, Clone, Copy)]
    pub struct HciAdapterResolver;

    impl AdapterResolver for HciAdapterResolver {
        fn resolve(&self, _source: BdAddr) -> Result<AdapterId, ResolveError> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "HCI sockets are only available on Linux").into())
        }
    }
}
