//! In-memory L2CAP connector for unit and integration testing.
//!
//! # Why a mock connector?
//!
//! The real [`super::L2capConnector`] needs a Bluetooth adapter, a paired
//! host within radio range, and root privileges.  None of that exists on a
//! CI machine, and none of it lets a test see which bytes went where.
//!
//! The `MockConnector` hands out [`MockChannel`]s that append every write to
//! a shared, ordered log, and record their own close when dropped.  Tests
//! can therefore assert on:
//!
//! - which PSMs were opened, in what order;
//! - every packet written on each channel, in global order;
//! - that each opened channel was closed exactly once.
//!
//! # Failure injection
//!
//! - [`MockConnector::fail_connect_on`] makes opening a given PSM fail.
//! - [`MockConnector::fail_writes_on`] makes every write on a PSM fail.
//! - [`MockConnector::set_write_limit`] truncates writes on a PSM to
//!   simulate short writes.

use std::io;
use std::sync::{Arc, Mutex};

use bthid_core::{
    protocol::report::{PSM_HID_CONTROL, PSM_HID_INTERRUPT},
    BdAddr,
};

use crate::application::type_text::{ChannelConnector, HidChannel, TransportError};

/// Shared record of everything that happened on the mock transport.
#[derive(Debug, Default)]
struct TransportLog {
    /// `(source, target, psm)` of every connect call, successful or not.
    attempts: Vec<(BdAddr, BdAddr, u16)>,
    /// `(psm, packet)` of every successful write, in global order.
    writes: Vec<(u16, Vec<u8>)>,
    /// PSM of every channel closed, in close order.
    closed: Vec<u16>,
}

/// Failure switches, read when a channel is opened or written.
#[derive(Debug, Default, Clone)]
struct Faults {
    fail_connect: Vec<u16>,
    fail_writes: Vec<u16>,
    write_limits: Vec<(u16, usize)>,
}

/// A connector that records all traffic instead of touching the radio.
#[derive(Default)]
pub struct MockConnector {
    log: Arc<Mutex<TransportLog>>,
    faults: Mutex<Faults>,
}

impl MockConnector {
    /// Creates a connector on which every operation succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes connecting to `psm` fail with `ConnectionRefused`.
    pub fn fail_connect_on(&self, psm: u16) {
        self.faults.lock().unwrap().fail_connect.push(psm);
    }

    /// Makes every write on channels for `psm` fail with `BrokenPipe`.
    pub fn fail_writes_on(&self, psm: u16) {
        self.faults.lock().unwrap().fail_writes.push(psm);
    }

    /// Caps the byte count accepted by each write on channels for `psm`.
    /// `None` removes the cap.
    pub fn set_write_limit(&self, psm: u16, limit: Option<usize>) {
        let mut faults = self.faults.lock().unwrap();
        faults.write_limits.retain(|(p, _)| *p != psm);
        if let Some(limit) = limit {
            faults.write_limits.push((psm, limit));
        }
    }

    /// Returns the PSM of every connect attempt, in order.
    pub fn connect_attempts(&self) -> Vec<u16> {
        self.log.lock().unwrap().attempts.iter().map(|a| a.2).collect()
    }

    /// Returns the `(source, target)` pair of every connect attempt.
    pub fn connect_endpoints(&self) -> Vec<(BdAddr, BdAddr)> {
        self.log.lock().unwrap().attempts.iter().map(|a| (a.0, a.1)).collect()
    }

    /// Returns every `(psm, packet)` write, in global order.
    pub fn writes(&self) -> Vec<(u16, Vec<u8>)> {
        self.log.lock().unwrap().writes.clone()
    }

    /// Returns the packets written on the control channel.
    pub fn control_writes(&self) -> Vec<Vec<u8>> {
        self.writes_on(PSM_HID_CONTROL)
    }

    /// Returns the packets written on the interrupt channel.
    pub fn interrupt_writes(&self) -> Vec<Vec<u8>> {
        self.writes_on(PSM_HID_INTERRUPT)
    }

    /// Returns the PSM of every closed channel, in close order.
    pub fn closed_psms(&self) -> Vec<u16> {
        self.log.lock().unwrap().closed.clone()
    }

    fn writes_on(&self, psm: u16) -> Vec<Vec<u8>> {
        self.log
            .lock()
            .unwrap()
            .writes
            .iter()
            .filter(|(p, _)| *p == psm)
            .map(|(_, packet)| packet.clone())
            .collect()
    }
}

impl ChannelConnector for MockConnector {
    fn connect(
        &self,
        source: BdAddr,
        target: BdAddr,
        psm: u16,
    ) -> Result<Box<dyn HidChannel>, TransportError> {
        self.log.lock().unwrap().attempts.push((source, target, psm));

        let faults = self.faults.lock().unwrap().clone();
        if faults.fail_connect.contains(&psm) {
            return Err(TransportError::Open {
                psm,
                target,
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            });
        }

        Ok(Box::new(MockChannel {
            psm,
            log: Arc::clone(&self.log),
            fail_writes: faults.fail_writes.contains(&psm),
            write_limit: faults
                .write_limits
                .iter()
                .find(|(p, _)| *p == psm)
                .map(|(_, limit)| *limit),
        }))
    }
}

/// One mock channel.  Records its close when dropped.
pub struct MockChannel {
    psm: u16,
    log: Arc<Mutex<TransportLog>>,
    fail_writes: bool,
    write_limit: Option<usize>,
}

impl HidChannel for MockChannel {
    fn send(&mut self, packet: &[u8]) -> Result<usize, TransportError> {
        if self.fail_writes {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe).into());
        }
        let accepted = self.write_limit.map_or(packet.len(), |l| l.min(packet.len()));
        self.log
            .lock()
            .unwrap()
            .writes
            .push((self.psm, packet[..accepted].to_vec()));
        Ok(accepted)
    }
}

impl Drop for MockChannel {
    fn drop(&mut self) {
        if let Ok(mut log) = self.log.lock() {
            log.closed.push(self.psm);
        }
    }
}
