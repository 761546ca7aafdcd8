//! USB HID Usage IDs (page 0x07, Keyboard/Keypad page).
//!
//! These are the values that end up in the six key slots of every input
//! report sent to the host.  Modifier keys (0xE0–0xE7) never occupy a slot;
//! they are folded into the report's modifier byte instead, one bit each.
//!
//! Reference: USB HID Usage Tables 1.3, Section 10 (Keyboard/Keypad page 0x07).
//!
//! # What is a HID Usage ID? (for beginners)
//!
//! The HID standard assigns a number to every *physical key position*, not to
//! every character.  `'a'` and `'A'` are the same usage (0x04); the host
//! decides which character to produce by looking at the shift bit in the
//! modifier byte.  This is why typing text means sending a sequence of
//! *key states* rather than characters.
//!
//! | Key          | HID Usage ID |
//! |--------------|-------------|
//! | Letter A     | 0x04        |
//! | Enter        | 0x28        |
//! | Backspace    | 0x2A        |
//! | Left Shift   | 0xE1        |
//!
//! # The `Unknown` sentinel
//!
//! [`HidKeyCode::Unknown`] has the value 0x00, which is also the HID
//! "no key pressed" usage.  An empty rollover slot is therefore encoded as
//! `HidKeyCode::Unknown.as_u8()`.

/// USB HID Usage ID for keyboard keys (page 0x07).
///
/// The numeric value of each variant is its HID Usage ID on the keyboard/keypad page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[rustfmt::skip]
pub enum HidKeyCode {
    // 0x04..=0x1D, discriminants count up from KeyA
    KeyA = 0x04, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM,
    KeyN, KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    // 0x1E..=0x27
    Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9, Digit0,

    // 0x28..=0x31
    Enter, Escape, Backspace, Tab, Space, Minus, Equal, BracketLeft, BracketRight, Backslash,

    // 0x32 (Non-US #) is skipped
    Semicolon = 0x33, Quote, Backquote, Comma, Period, Slash, CapsLock,

    // 0xE0..=0xE7, one modifier byte bit each
    ControlLeft = 0xE0, ShiftLeft, AltLeft, MetaLeft,
    ControlRight, ShiftRight, AltRight, MetaRight,

    /// Sentinel for keys with no HID mapping; doubles as the empty slot value.
    Unknown = 0x00,
}

impl HidKeyCode {
    /// Every variant except [`HidKeyCode::Unknown`], in usage order.
    pub const ALL: [HidKeyCode; 61] = {
        use HidKeyCode::*;
        [
            KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM,
            KeyN, KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
            Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9, Digit0,
            Enter, Escape, Backspace, Tab, Space, Minus, Equal, BracketLeft, BracketRight,
            Backslash, Semicolon, Quote, Backquote, Comma, Period, Slash, CapsLock,
            ControlLeft, ShiftLeft, AltLeft, MetaLeft, ControlRight, ShiftRight, AltRight,
            MetaRight,
        ]
    };

    /// Looks up the variant for a raw usage ID; anything outside this table
    /// is [`HidKeyCode::Unknown`].
    pub fn from_u8(value: u8) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_u8() == value)
            .unwrap_or(HidKeyCode::Unknown)
    }

    /// Returns the raw USB HID Usage ID value for this key code.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns `true` if this is a modifier key.
    pub fn is_modifier(self) -> bool {
        self.modifier_bit().is_some()
    }

    /// Returns the bit this key occupies in the report's modifier byte.
    ///
    /// The boot keyboard assigns modifiers to bits in usage order, so
    /// `ControlLeft` (0xE0) is bit 0 and `MetaRight` (0xE7) is bit 7.
    /// Returns `None` for every non-modifier key.
    pub fn modifier_bit(self) -> Option<u8> {
        match self {
            HidKeyCode::ControlLeft
            | HidKeyCode::ShiftLeft
            | HidKeyCode::AltLeft
            | HidKeyCode::MetaLeft
            | HidKeyCode::ControlRight
            | HidKeyCode::ShiftRight
            | HidKeyCode::AltRight
            | HidKeyCode::MetaRight => Some(1 << (self.as_u8() - HidKeyCode::ControlLeft.as_u8())),
            _ => None,
        }
    }
}
