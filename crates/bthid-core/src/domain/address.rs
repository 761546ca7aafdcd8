//! Bluetooth device address (`BD_ADDR`).
//!
//! Addresses are written most-significant byte first (`AA:BB:CC:DD:EE:FF`),
//! which is how users and tools such as `hcitool` print them.  On the wire and
//! in kernel socket structures the same six bytes are stored in reverse
//! (little-endian) order; [`BdAddr::to_le_bytes`] produces that form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned when parsing a [`BdAddr`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("expected 6 colon-separated octets, got {0}")]
    WrongOctetCount(usize),

    #[error("invalid octet {0:?}: expected two hex digits")]
    InvalidOctet(String),
}

/// A 48-bit Bluetooth device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BdAddr([u8; 6]);

impl BdAddr {
    /// The wildcard address (`00:00:00:00:00:00`): "any local adapter".
    pub const ANY: BdAddr = BdAddr([0; 6]);

    /// Creates an address from its bytes in display order.
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Returns the bytes in display (most-significant first) order.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Returns the bytes in the reversed order used by the kernel.
    pub fn to_le_bytes(&self) -> [u8; 6] {
        let mut b = self.0;
        b.reverse();
        b
    }

    /// Builds an address from kernel (little-endian) byte order.
    pub fn from_le_bytes(mut bytes: [u8; 6]) -> Self {
        bytes.reverse();
        Self(bytes)
    }

    pub fn is_any(&self) -> bool {
        *self == Self::ANY
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl FromStr for BdAddr {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 6 {
            return Err(AddressParseError::WrongOctetCount(parts.len()));
        }
        let mut bytes = [0u8; 6];
        for (slot, part) in bytes.iter_mut().zip(&parts) {
            if part.len() != 2 {
                return Err(AddressParseError::InvalidOctet((*part).to_string()));
            }
            *slot = u8::from_str_radix(part, 16)
                .map_err(|_| AddressParseError::InvalidOctet((*part).to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for BdAddr {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BdAddr> for String {
    fn from(addr: BdAddr) -> Self {
        addr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_round_trip_uppercase() {
        // Arrange / Act
        let addr: BdAddr = "aa:bb:cc:01:02:03".parse().unwrap();

        // Assert
        assert_eq!(addr.octets(), [0xAA, 0xBB, 0xCC, 0x01, 0x02, 0x03]);
        assert_eq!(addr.to_string(), "AA:BB:CC:01:02:03");
    }

    #[test]
    fn test_parse_rejects_wrong_octet_count() {
        assert_eq!(
            "AA:BB:CC:DD:EE".parse::<BdAddr>(),
            Err(AddressParseError::WrongOctetCount(5))
        );
        assert_eq!("".parse::<BdAddr>(), Err(AddressParseError::WrongOctetCount(1)));
    }

    #[test]
    fn test_parse_rejects_non_hex_octet() {
        assert_eq!(
            "AA:BB:CC:DD:EE:GG".parse::<BdAddr>(),
            Err(AddressParseError::InvalidOctet("GG".to_string()))
        );
        assert_eq!(
            "AA:BB:CC:DD:EE:F".parse::<BdAddr>(),
            Err(AddressParseError::InvalidOctet("F".to_string()))
        );
    }

    #[test]
    fn test_any_is_all_zeroes() {
        assert!(BdAddr::ANY.is_any());
        assert!("00:00:00:00:00:00".parse::<BdAddr>().unwrap().is_any());
        assert!(!BdAddr::new([0, 0, 0, 0, 0, 1]).is_any());
    }

    #[test]
    fn test_le_bytes_are_reversed() {
        let addr = BdAddr::new([1, 2, 3, 4, 5, 6]);

        assert_eq!(addr.to_le_bytes(), [6, 5, 4, 3, 2, 1]);
        assert_eq!(BdAddr::from_le_bytes([6, 5, 4, 3, 2, 1]), addr);
    }

    #[test]
    fn test_serde_uses_string_form() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Wrapper {
            addr: BdAddr,
        }

        let w = Wrapper { addr: BdAddr::new([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]) };
        let text = toml::to_string(&w).unwrap();
        assert!(text.contains("\"11:22:33:44:55:66\""));

        let back: Wrapper = toml::from_str(&text).unwrap();
        assert_eq!(back, w);

        assert!(toml::from_str::<Wrapper>("addr = \"nope\"").is_err());
    }
}
