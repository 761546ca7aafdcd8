//! Key combination → press/release event expansion.
//!
//! # Why an explicit event list? (for beginners)
//!
//! Typing `H` on a real keyboard is four distinct physical actions:
//!
//! ```text
//! press Shift, press H, release H, release Shift
//! ```
//!
//! The host only sees the keyboard *state* after each action, so every one
//! of those actions must become its own report.  [`sequence`] produces the
//! actions in that order: all presses first (shift before the base key), then
//! all releases in exactly the reverse order.

use thiserror::Error;

use crate::keymap::{KeyCombination, LinuxKey};

/// Number of events the longest combination expands to (shift + base key).
pub const MAX_EVENTS_PER_COMBINATION: usize = 4;

/// A single key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: LinuxKey,
    pub pressed: bool,
}

impl KeyEvent {
    pub fn press(key: LinuxKey) -> Self {
        Self { key, pressed: true }
    }

    pub fn release(key: LinuxKey) -> Self {
        Self { key, pressed: false }
    }
}

/// Errors produced by [`sequence`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    /// The output buffer cannot hold every event of the combination.
    #[error("event buffer too small: need {needed} slots, have {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },
}

/// Expands `combo` into press/release events written to the front of `out`.
///
/// Returns the number of events written.  Nothing is written when the buffer
/// is too small.
///
/// # Errors
///
/// Returns [`SequenceError::CapacityExceeded`] if `out` is shorter than the
/// expansion (2 events unshifted, 4 shifted).
pub fn sequence(combo: &KeyCombination, out: &mut [KeyEvent]) -> Result<usize, SequenceError> {
    let mut keys = [combo.key; 2];
    let key_count = match combo.shift.key() {
        Some(shift) => {
            keys[0] = shift;
            2
        }
        None => 1,
    };
    let keys = &keys[..key_count];

    let needed = keys.len() * 2;
    if out.len() < needed {
        return Err(SequenceError::CapacityExceeded {
            needed,
            capacity: out.len(),
        });
    }

    let presses = keys.iter().map(|&k| KeyEvent::press(k));
    let releases = keys.iter().rev().map(|&k| KeyEvent::release(k));
    for (slot, event) in out.iter_mut().zip(presses.chain(releases)) {
        *slot = event;
    }

    Ok(needed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{translate, Shift};

    fn empty_buffer() -> [KeyEvent; MAX_EVENTS_PER_COMBINATION] {
        [KeyEvent::release(LinuxKey(0)); MAX_EVENTS_PER_COMBINATION]
    }

    #[test]
    fn test_unshifted_combination_is_press_then_release() {
        // Arrange
        let combo = KeyCombination { key: LinuxKey::I, shift: Shift::None };
        let mut buf = empty_buffer();

        // Act
        let len = sequence(&combo, &mut buf).unwrap();

        // Assert
        assert_eq!(len, 2);
        assert_eq!(&buf[..len], &[KeyEvent::press(LinuxKey::I), KeyEvent::release(LinuxKey::I)]);
    }

    #[test]
    fn test_shifted_combination_releases_in_reverse_order() {
        // Arrange
        let combo = KeyCombination { key: LinuxKey::H, shift: Shift::Left };
        let mut buf = empty_buffer();

        // Act
        let len = sequence(&combo, &mut buf).unwrap();

        // Assert
        assert_eq!(len, 4);
        assert_eq!(
            buf,
            [
                KeyEvent::press(LinuxKey::LEFTSHIFT),
                KeyEvent::press(LinuxKey::H),
                KeyEvent::release(LinuxKey::H),
                KeyEvent::release(LinuxKey::LEFTSHIFT),
            ]
        );
    }

    #[test]
    fn test_every_translatable_char_yields_mirrored_sequence() {
        for code in 0u8..=127 {
            let Ok(combo) = translate(code as char) else { continue };
            let mut buf = empty_buffer();

            let len = sequence(&combo, &mut buf).unwrap();

            let expected_len = if combo.shift == Shift::None { 2 } else { 4 };
            assert_eq!(len, expected_len, "char {code}");
            let (presses, releases) = buf[..len].split_at(len / 2);
            assert!(presses.iter().all(|e| e.pressed));
            assert!(releases.iter().all(|e| !e.pressed));
            let reversed: Vec<LinuxKey> = releases.iter().rev().map(|e| e.key).collect();
            let pressed: Vec<LinuxKey> = presses.iter().map(|e| e.key).collect();
            assert_eq!(pressed, reversed, "char {code} releases must mirror presses");
        }
    }

    #[test]
    fn test_short_buffer_reports_capacity_exceeded() {
        // Arrange
        let combo = KeyCombination { key: LinuxKey::A, shift: Shift::Right };
        let mut buf = [KeyEvent::press(LinuxKey(0)); 3];

        // Act
        let result = sequence(&combo, &mut buf);

        // Assert
        assert_eq!(result, Err(SequenceError::CapacityExceeded { needed: 4, capacity: 3 }));
        assert!(buf.iter().all(|e| e.key == LinuxKey(0)), "buffer must be untouched");
    }

    #[test]
    fn test_exact_capacity_is_enough() {
        let combo = KeyCombination { key: LinuxKey::SPACE, shift: Shift::None };
        let mut buf = [KeyEvent::press(LinuxKey(0)); 2];

        assert_eq!(sequence(&combo, &mut buf), Ok(2));
    }
}
