//! Linux input-event key codes and their translation to USB HID Usage IDs.
//!
//! Reference: `linux/input-event-codes.h` (`KEY_*` constants) and USB HID
//! Usage Tables 1.3.
//!
//! # Why Linux key codes? (for beginners)
//!
//! The typing pipeline is written in terms of *which physical key moves*,
//! and the Linux input subsystem already has a stable, well-known number for
//! every key (`KEY_A = 30`, `KEY_ENTER = 28`, ...).  Using those numbers as
//! the generic key identifier keeps the ASCII table readable against the
//! kernel headers, and the translation to the HID numbering the host expects
//! happens in exactly one place: [`evdev_to_hid`].
//!
//! # How this table works
//!
//! `EVDEV_TO_HID_TABLE` is a compile-time array of 256 [`HidKeyCode`] values
//! indexed by the Linux key code.  Codes >= 256 (multimedia and button
//! ranges) are outside what a 101-key boot keyboard can report and always
//! translate to [`HidKeyCode::Unknown`].

use super::hid::HidKeyCode;

/// A Linux input-event key code (`KEY_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinuxKey(pub u16);

impl LinuxKey {
    pub const ESC: LinuxKey = LinuxKey(1);
    pub const KEY_1: LinuxKey = LinuxKey(2);
    pub const KEY_2: LinuxKey = LinuxKey(3);
    pub const KEY_3: LinuxKey = LinuxKey(4);
    pub const KEY_4: LinuxKey = LinuxKey(5);
    pub const KEY_5: LinuxKey = LinuxKey(6);
    pub const KEY_6: LinuxKey = LinuxKey(7);
    pub const KEY_7: LinuxKey = LinuxKey(8);
    pub const KEY_8: LinuxKey = LinuxKey(9);
    pub const KEY_9: LinuxKey = LinuxKey(10);
    pub const KEY_0: LinuxKey = LinuxKey(11);
    pub const MINUS: LinuxKey = LinuxKey(12);
    pub const EQUAL: LinuxKey = LinuxKey(13);
    pub const BACKSPACE: LinuxKey = LinuxKey(14);
    pub const TAB: LinuxKey = LinuxKey(15);
    pub const Q: LinuxKey = LinuxKey(16);
    pub const W: LinuxKey = LinuxKey(17);
    pub const E: LinuxKey = LinuxKey(18);
    pub const R: LinuxKey = LinuxKey(19);
    pub const T: LinuxKey = LinuxKey(20);
    pub const Y: LinuxKey = LinuxKey(21);
    pub const U: LinuxKey = LinuxKey(22);
    pub const I: LinuxKey = LinuxKey(23);
    pub const O: LinuxKey = LinuxKey(24);
    pub const P: LinuxKey = LinuxKey(25);
    pub const LEFTBRACE: LinuxKey = LinuxKey(26);
    pub const RIGHTBRACE: LinuxKey = LinuxKey(27);
    pub const ENTER: LinuxKey = LinuxKey(28);
    pub const LEFTCTRL: LinuxKey = LinuxKey(29);
    pub const A: LinuxKey = LinuxKey(30);
    pub const S: LinuxKey = LinuxKey(31);
    pub const D: LinuxKey = LinuxKey(32);
    pub const F: LinuxKey = LinuxKey(33);
    pub const G: LinuxKey = LinuxKey(34);
    pub const H: LinuxKey = LinuxKey(35);
    pub const J: LinuxKey = LinuxKey(36);
    pub const K: LinuxKey = LinuxKey(37);
    pub const L: LinuxKey = LinuxKey(38);
    pub const SEMICOLON: LinuxKey = LinuxKey(39);
    pub const APOSTROPHE: LinuxKey = LinuxKey(40);
    pub const GRAVE: LinuxKey = LinuxKey(41);
    pub const LEFTSHIFT: LinuxKey = LinuxKey(42);
    pub const BACKSLASH: LinuxKey = LinuxKey(43);
    pub const Z: LinuxKey = LinuxKey(44);
    pub const X: LinuxKey = LinuxKey(45);
    pub const C: LinuxKey = LinuxKey(46);
    pub const V: LinuxKey = LinuxKey(47);
    pub const B: LinuxKey = LinuxKey(48);
    pub const N: LinuxKey = LinuxKey(49);
    pub const M: LinuxKey = LinuxKey(50);
    pub const COMMA: LinuxKey = LinuxKey(51);
    pub const DOT: LinuxKey = LinuxKey(52);
    pub const SLASH: LinuxKey = LinuxKey(53);
    pub const RIGHTSHIFT: LinuxKey = LinuxKey(54);
    pub const LEFTALT: LinuxKey = LinuxKey(56);
    pub const SPACE: LinuxKey = LinuxKey(57);
    pub const CAPSLOCK: LinuxKey = LinuxKey(58);
    pub const RIGHTCTRL: LinuxKey = LinuxKey(97);
    pub const RIGHTALT: LinuxKey = LinuxKey(100);
    pub const LEFTMETA: LinuxKey = LinuxKey(125);
    pub const RIGHTMETA: LinuxKey = LinuxKey(126);

    /// Returns the raw kernel key code.
    pub fn code(self) -> u16 {
        self.0
    }
}

impl From<u16> for LinuxKey {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// Translates a Linux key code to a HID Usage ID.
///
/// Returns [`HidKeyCode::Unknown`] for codes that have no boot-keyboard HID
/// equivalent, including every code >= 256.
///
/// # Panics
///
/// This function never panics; all u16 inputs are handled.
pub fn evdev_to_hid(key: LinuxKey) -> HidKeyCode {
    match EVDEV_TO_HID_TABLE.get(key.0 as usize) {
        Some(&hid) => hid,
        None => HidKeyCode::Unknown,
    }
}

/// Linux key code → HID mapping table indexed by `KEY_*` value (0–255).
const EVDEV_TO_HID_TABLE: [HidKeyCode; 256] = {
    use HidKeyCode::*;
    let mut t = [Unknown; 256];

    t[1] = Escape;
    t[2] = Digit1;
    t[3] = Digit2;
    t[4] = Digit3;
    t[5] = Digit4;
    t[6] = Digit5;
    t[7] = Digit6;
    t[8] = Digit7;
    t[9] = Digit8;
    t[10] = Digit9;
    t[11] = Digit0;
    t[12] = Minus;
    t[13] = Equal;
    t[14] = Backspace;
    t[15] = Tab;
    t[16] = KeyQ;
    t[17] = KeyW;
    t[18] = KeyE;
    t[19] = KeyR;
    t[20] = KeyT;
    t[21] = KeyY;
    t[22] = KeyU;
    t[23] = KeyI;
    t[24] = KeyO;
    t[25] = KeyP;
    t[26] = BracketLeft;
    t[27] = BracketRight;
    t[28] = Enter;
    t[29] = ControlLeft;
    t[30] = KeyA;
    t[31] = KeyS;
    t[32] = KeyD;
    t[33] = KeyF;
    t[34] = KeyG;
    t[35] = KeyH;
    t[36] = KeyJ;
    t[37] = KeyK;
    t[38] = KeyL;
    t[39] = Semicolon;
    t[40] = Quote;
    t[41] = Backquote;
    t[42] = ShiftLeft;
    t[43] = Backslash;
    t[44] = KeyZ;
    t[45] = KeyX;
    t[46] = KeyC;
    t[47] = KeyV;
    t[48] = KeyB;
    t[49] = KeyN;
    t[50] = KeyM;
    t[51] = Comma;
    t[52] = Period;
    t[53] = Slash;
    t[54] = ShiftRight;
    t[56] = AltLeft;
    t[57] = Space;
    t[58] = CapsLock;
    t[97] = ControlRight;
    t[100] = AltRight;
    t[125] = MetaLeft;
    t[126] = MetaRight;

    t
};
