//! Keyboard state machine: modifier bitmask + 6-key rollover slots.
//!
//! # How the rollover slots behave (for beginners)
//!
//! A boot keyboard report can carry up to six pressed non-modifier keys.
//! The slots are kept *compact*: occupied entries always start at index 0,
//! and when a key is released everything to its right shifts one place left.
//!
//! ```text
//! press A   → [A, 0, 0, 0, 0, 0]
//! press B   → [A, B, 0, 0, 0, 0]
//! release A → [B, 0, 0, 0, 0, 0]
//! ```
//!
//! A press for a key that is already in a slot leaves the slots as they are
//! (the key never appears twice), and a seventh simultaneous press is
//! dropped.
//!
//! Modifier keys never occupy a slot; each toggles one bit of the modifier
//! byte instead.

use tracing::debug;

use crate::domain::sequence::KeyEvent;
use crate::keymap::{evdev_to_hid, HidKeyCode};
use crate::protocol::report::{InputReport, REPORT_LEN, ROLLOVER_SLOTS};

/// Key codes at or above this value are outside the boot keyboard's range.
const MAX_REPORTABLE_KEY: u16 = 256;

/// Current state of the emulated keyboard, one instance per session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardState {
    report: InputReport,
}

impl KeyboardState {
    /// Creates a keyboard with no keys pressed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one key transition.
    ///
    /// Returns `true` if the report changed and must be transmitted.
    /// Modifier transitions always count as a change.  Presses of keys that
    /// are already held, presses that find every slot occupied, releases of
    /// keys that are not held, keys with no
    /// HID usage and key codes >= 256 leave the report untouched and return
    /// `false`.
    pub fn apply(&mut self, event: KeyEvent) -> bool {
        if event.key.code() >= MAX_REPORTABLE_KEY {
            debug!(code = event.key.code(), "ignoring key outside the boot keyboard range");
            return false;
        }

        let hid = evdev_to_hid(event.key);
        if let Some(bit) = hid.modifier_bit() {
            if event.pressed {
                self.report.modifiers.0 |= bit;
            } else {
                self.report.modifiers.0 &= !bit;
            }
            return true;
        }

        if hid == HidKeyCode::Unknown {
            debug!(code = event.key.code(), "ignoring key with no HID usage");
            return false;
        }

        self.reconcile_slot(hid.as_u8(), event.pressed)
    }

    fn reconcile_slot(&mut self, usage: u8, pressed: bool) -> bool {
        let keys = &mut self.report.keys;

        if let Some(pos) = keys.iter().position(|&k| k == usage) {
            if pressed {
                // Already held: the report stays as it is.
                return false;
            }
            keys.copy_within(pos + 1.., pos);
            keys[ROLLOVER_SLOTS - 1] = 0;
            return true;
        }

        if !pressed {
            return false;
        }

        match keys.iter().position(|&k| k == 0) {
            Some(free) => {
                keys[free] = usage;
                true
            }
            None => {
                debug!(usage, "rollover slots full, dropping key press");
                false
            }
        }
    }

    /// Returns the report as currently held.
    pub fn report(&self) -> &InputReport {
        &self.report
    }

    /// Returns the encoded bytes of the current report.
    pub fn snapshot(&self) -> [u8; REPORT_LEN] {
        self.report.encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::LinuxKey;
    use crate::protocol::report::ModifierFlags;

    fn press(k: LinuxKey) -> KeyEvent {
        KeyEvent::press(k)
    }

    fn release(k: LinuxKey) -> KeyEvent {
        KeyEvent::release(k)
    }

    #[test]
    fn test_new_keyboard_snapshot_is_empty_report() {
        assert_eq!(KeyboardState::new().snapshot(), [0xA1, 0x01, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_shift_press_and_release_toggle_modifier_bit() {
        // Arrange
        let mut kb = KeyboardState::new();

        // Act / Assert
        assert!(kb.apply(press(LinuxKey::RIGHTSHIFT)));
        assert_eq!(kb.report().modifiers.0, ModifierFlags::RIGHT_SHIFT);

        assert!(kb.apply(press(LinuxKey::LEFTCTRL)));
        assert_eq!(kb.report().modifiers.0, ModifierFlags::RIGHT_SHIFT | ModifierFlags::LEFT_CTRL);

        assert!(kb.apply(release(LinuxKey::RIGHTSHIFT)));
        assert_eq!(kb.report().modifiers.0, ModifierFlags::LEFT_CTRL);
    }

    #[test]
    fn test_modifier_transition_reports_change_even_if_bit_unchanged() {
        let mut kb = KeyboardState::new();

        assert!(kb.apply(release(LinuxKey::LEFTSHIFT)));
        assert!(kb.report().modifiers.is_empty());
    }

    #[test]
    fn test_modifiers_never_occupy_a_slot() {
        let mut kb = KeyboardState::new();

        kb.apply(press(LinuxKey::LEFTMETA));
        kb.apply(press(LinuxKey::RIGHTALT));

        assert_eq!(kb.report().keys, [0; 6]);
    }

    #[test]
    fn test_press_fills_first_empty_slot() {
        // Arrange
        let mut kb = KeyboardState::new();

        // Act
        assert!(kb.apply(press(LinuxKey::A)));
        assert!(kb.apply(press(LinuxKey::B)));

        // Assert
        assert_eq!(kb.report().keys, [0x04, 0x05, 0, 0, 0, 0]);
    }

    #[test]
    fn test_release_compacts_remaining_slots_left() {
        // Arrange
        let mut kb = KeyboardState::new();
        for k in [LinuxKey::A, LinuxKey::B, LinuxKey::C] {
            kb.apply(press(k));
        }

        // Act
        let changed = kb.apply(release(LinuxKey::A));

        // Assert
        assert!(changed);
        assert_eq!(kb.report().keys, [0x05, 0x06, 0, 0, 0, 0]);
    }

    #[test]
    fn test_duplicate_press_keeps_single_entry() {
        // Arrange
        let mut kb = KeyboardState::new();
        kb.apply(press(LinuxKey::A));
        kb.apply(press(LinuxKey::B));
        let before = kb.snapshot();

        // Act
        let changed = kb.apply(press(LinuxKey::A));

        // Assert
        assert!(!changed);
        assert_eq!(kb.report().keys.iter().filter(|&&k| k == 0x04).count(), 1);
        assert_eq!(kb.report().keys, [0x04, 0x05, 0, 0, 0, 0]);
        assert_eq!(kb.snapshot(), before);
    }

    #[test]
    fn test_release_after_duplicate_press_clears_key() {
        let mut kb = KeyboardState::new();
        kb.apply(press(LinuxKey::A));
        kb.apply(press(LinuxKey::A));

        assert!(kb.apply(release(LinuxKey::A)));
        assert_eq!(kb.report().keys, [0; 6]);
    }

    #[test]
    fn test_slots_never_hold_duplicates() {
        let mut kb = KeyboardState::new();
        for _ in 0..5 {
            kb.apply(press(LinuxKey::Z));
            let count = kb.report().keys.iter().filter(|&&k| k == 0x1D).count();
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn test_seventh_press_is_dropped() {
        // Arrange
        let mut kb = KeyboardState::new();
        let keys = [
            LinuxKey::A,
            LinuxKey::B,
            LinuxKey::C,
            LinuxKey::D,
            LinuxKey::E,
            LinuxKey::F,
        ];
        for k in keys {
            assert!(kb.apply(press(k)));
        }
        let before = kb.snapshot();

        // Act
        let changed = kb.apply(press(LinuxKey::G));

        // Assert
        assert!(!changed);
        assert_eq!(kb.snapshot(), before);
        assert_eq!(kb.report().keys, [0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);
    }

    #[test]
    fn test_release_of_unheld_key_is_a_no_op() {
        let mut kb = KeyboardState::new();
        kb.apply(press(LinuxKey::A));

        assert!(!kb.apply(release(LinuxKey::B)));
        assert_eq!(kb.report().keys, [0x04, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_high_key_codes_are_ignored() {
        let mut kb = KeyboardState::new();

        assert!(!kb.apply(press(LinuxKey(256))));
        assert!(!kb.apply(press(LinuxKey(0x2FF))));
        assert_eq!(kb, KeyboardState::new());
    }

    #[test]
    fn test_unmapped_key_is_ignored() {
        let mut kb = KeyboardState::new();

        // KEY_F1 has no usage in this table
        assert!(!kb.apply(press(LinuxKey(59))));
        assert_eq!(kb.report().keys, [0; 6]);
    }

    #[test]
    fn test_snapshot_reflects_shifted_letter() {
        // Arrange
        let mut kb = KeyboardState::new();

        // Act
        kb.apply(press(LinuxKey::LEFTSHIFT));
        kb.apply(press(LinuxKey::H));

        // Assert
        assert_eq!(kb.snapshot(), [0xA1, 0x01, 0x02, 0x00, 0x0B, 0, 0, 0, 0, 0]);
    }
}
