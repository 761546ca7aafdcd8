//! Bluetooth HID (HIDP) keyboard input report and channel constants.
//!
//! Wire format of one report on the interrupt channel:
//! ```text
//! [hidp_header:1 = 0xA1][report_id:1 = 0x01][modifiers:1][reserved:1 = 0][keys:6]
//! ```
//! Total size: 10 bytes.  The first byte is the HIDP transaction header
//! (DATA | INPUT); the remaining nine are the boot keyboard report prefixed
//! with its report ID.

use thiserror::Error;

use crate::keymap::hid::HidKeyCode;

/// HIDP transaction header for an input report (DATA 0xA0 | INPUT 0x01).
pub const HIDP_DATA_INPUT: u8 = 0xA1;

/// Report ID declared in the keyboard report descriptor.
pub const KEYBOARD_REPORT_ID: u8 = 0x01;

/// Number of simultaneously reportable non-modifier keys.
pub const ROLLOVER_SLOTS: usize = 6;

/// Total encoded report size in bytes.
pub const REPORT_LEN: usize = 4 + ROLLOVER_SLOTS;

/// L2CAP PSM of the HID control channel.
pub const PSM_HID_CONTROL: u16 = 0x0011;

/// L2CAP PSM of the HID interrupt channel.
pub const PSM_HID_INTERRUPT: u16 = 0x0013;

/// Messages written once on the control channel before the first report.
///
/// Some hosts ignore input until they have seen these two output-report
/// frames followed by a short pause.
pub const HANDSHAKE_MESSAGES: [[u8; 3]; 2] = [[0xA1, 0x13, 0x03], [0xA1, 0x13, 0x02]];

// ── Modifier bits ─────────────────────────────────────────────────────────────

/// Bitmask of active modifier keys in the boot keyboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierFlags(pub u8);

impl ModifierFlags {
    pub const LEFT_CTRL: u8 = 1 << 0;
    pub const LEFT_SHIFT: u8 = 1 << 1;
    pub const LEFT_ALT: u8 = 1 << 2;
    pub const LEFT_META: u8 = 1 << 3;
    pub const RIGHT_CTRL: u8 = 1 << 4;
    pub const RIGHT_SHIFT: u8 = 1 << 5;
    pub const RIGHT_ALT: u8 = 1 << 6;
    pub const RIGHT_META: u8 = 1 << 7;

    /// Returns `true` if no modifier is active.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Errors returned by [`InputReport::decode`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("report must be exactly 10 bytes, got {0}")]
    WrongLength(usize),

    #[error("unexpected report header 0x{header:02X} / id {report_id}")]
    BadHeader { header: u8, report_id: u8 },
}

/// Decoded keyboard input report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputReport {
    pub modifiers: ModifierFlags,
    pub keys: [u8; ROLLOVER_SLOTS],
}

impl InputReport {
    /// Serialises the report into its 10-byte wire form.
    pub fn encode(&self) -> [u8; REPORT_LEN] {
        let mut buf = [0u8; REPORT_LEN];
        buf[0] = HIDP_DATA_INPUT;
        buf[1] = KEYBOARD_REPORT_ID;
        buf[2] = self.modifiers.0;
        // buf[3] reserved
        buf[4..].copy_from_slice(&self.keys);
        buf
    }

    /// Parses a report previously produced by [`InputReport::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the length or constant header bytes differ.
    pub fn decode(bytes: &[u8]) -> Result<Self, ReportError> {
        if bytes.len() != REPORT_LEN {
            return Err(ReportError::WrongLength(bytes.len()));
        }
        if bytes[0] != HIDP_DATA_INPUT || bytes[1] != KEYBOARD_REPORT_ID {
            return Err(ReportError::BadHeader {
                header: bytes[0],
                report_id: bytes[1],
            });
        }
        let mut keys = [0u8; ROLLOVER_SLOTS];
        keys.copy_from_slice(&bytes[4..]);
        Ok(Self {
            modifiers: ModifierFlags(bytes[2]),
            keys,
        })
    }

    /// Returns the keys in the occupied slots, in slot order.
    pub fn pressed_keys(&self) -> impl Iterator<Item = HidKeyCode> + '_ {
        self.keys
            .iter()
            .copied()
            .filter(|&k| k != 0)
            .map(HidKeyCode::from_u8)
    }
}

/// Formats report bytes as space-separated hex, as used in trace logs.
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_encodes_constant_header_and_zeroes() {
        // Arrange
        let report = InputReport::default();

        // Act
        let bytes = report.encode();

        // Assert
        assert_eq!(bytes, [0xA1, 0x01, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_places_modifiers_and_keys() {
        // Arrange
        let report = InputReport {
            modifiers: ModifierFlags(ModifierFlags::LEFT_SHIFT),
            keys: [0x0B, 0, 0, 0, 0, 0],
        };

        // Act
        let bytes = report.encode();

        // Assert
        assert_eq!(bytes.len(), REPORT_LEN);
        assert_eq!(bytes[2], 0x02);
        assert_eq!(bytes[3], 0x00, "reserved byte must stay zero");
        assert_eq!(bytes[4], 0x0B);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        assert_eq!(InputReport::decode(&[0xA1, 0x01, 0]), Err(ReportError::WrongLength(3)));
    }

    #[test]
    fn test_decode_rejects_wrong_header() {
        let mut bytes = InputReport::default().encode();
        bytes[0] = 0xA2;

        assert_eq!(
            InputReport::decode(&bytes),
            Err(ReportError::BadHeader { header: 0xA2, report_id: 1 })
        );
    }

    #[test]
    fn test_decode_recovers_encoded_fields() {
        let original = InputReport {
            modifiers: ModifierFlags(ModifierFlags::RIGHT_SHIFT),
            keys: [0x04, 0x05, 0, 0, 0, 0],
        };

        let decoded = InputReport::decode(&original.encode()).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(
            decoded.pressed_keys().collect::<Vec<_>>(),
            vec![HidKeyCode::KeyA, HidKeyCode::KeyB]
        );
    }

    #[test]
    fn test_modifier_flags_is_empty() {
        assert!(!ModifierFlags(ModifierFlags::LEFT_ALT).is_empty());
        assert!(ModifierFlags::default().is_empty());
    }

    #[test]
    fn test_handshake_messages_are_fixed() {
        assert_eq!(HANDSHAKE_MESSAGES[0], [0xA1, 0x13, 0x03]);
        assert_eq!(HANDSHAKE_MESSAGES[1], [0xA1, 0x13, 0x02]);
    }

    #[test]
    fn test_hex_dump_format() {
        assert_eq!(hex_dump(&[0xA1, 0x01, 0x0f]), "a1 01 0f");
        assert_eq!(hex_dump(&[]), "");
    }
}
