//! Key code translation tables for text typing.
//!
//! The canonical representation on the wire is USB HID Usage IDs (page 0x07,
//! Keyboard/Keypad).  Text is first translated to Linux input key codes
//! ([`ascii`]), which are then mapped to HID usages ([`linux_input`]) by the
//! keyboard state machine.

pub mod ascii;
pub mod hid;
pub mod linux_input;

pub use ascii::{translate, KeyCombination, Shift, TranslateError};
pub use hid::HidKeyCode;
pub use linux_input::{evdev_to_hid, LinuxKey};

/// Unified key mapper providing both translation steps.
pub struct KeyMapper;

impl KeyMapper {
    /// Translates a character to the key combination that types it.
    ///
    /// # Errors
    ///
    /// Returns a [`TranslateError`] if the character cannot be typed.
    pub fn char_to_combination(c: char) -> Result<KeyCombination, TranslateError> {
        ascii::translate(c)
    }

    /// Translates a Linux key code to a [`HidKeyCode`].
    ///
    /// Returns [`HidKeyCode::Unknown`] if no mapping exists for `key`.
    pub fn linux_to_hid(key: LinuxKey) -> HidKeyCode {
        linux_input::evdev_to_hid(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_hid_through_both_tables() {
        // Arrange
        let combo = KeyMapper::char_to_combination('Q').unwrap();

        // Act
        let base = KeyMapper::linux_to_hid(combo.key);
        let shift = combo.shift.key().map(KeyMapper::linux_to_hid);

        // Assert
        assert_eq!(base, HidKeyCode::KeyQ);
        assert_eq!(shift, Some(HidKeyCode::ShiftRight));
    }

    #[test]
    fn test_every_translatable_char_maps_to_a_known_hid_usage() {
        for code in 0u8..=127 {
            let c = code as char;
            if let Ok(combo) = KeyMapper::char_to_combination(c) {
                assert_ne!(
                    KeyMapper::linux_to_hid(combo.key),
                    HidKeyCode::Unknown,
                    "{c:?} translates to a key with no HID usage"
                );
            }
        }
    }
}
