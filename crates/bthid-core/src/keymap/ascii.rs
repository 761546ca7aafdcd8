//! ASCII character → key combination translation (US layout).
//!
//! Every printable 7-bit character is produced on a US keyboard by one base
//! key, optionally held together with a shift key.  [`translate`] returns
//! that pair as a [`KeyCombination`].
//!
//! # Which shift key? (for beginners)
//!
//! A touch typist holds shift with the hand that is *not* striking the base
//! key.  The table below follows that convention: characters typed by the
//! left hand (`A`, `!`, `@`, ...) use the right shift, and characters typed
//! by the right hand (`H`, `(`, `?`, ...) use the left shift.  Hosts do not
//! care which side is used, but the reports look like a real keyboard's.
//!
//! # Escape
//!
//! Character 27 (ESC) is translated to the Backspace key, not the Escape
//! key.  A run of escapes is used to wake the host up before the payload,
//! and Backspace is the harmless way to produce that traffic in a text
//! field.

use thiserror::Error;

use super::linux_input::LinuxKey;

/// Highest character code the table covers.
pub const MAX_ASCII_CHAR: u32 = 127;

/// The escape character, used for the wake-up preamble.
pub const ESCAPE_CHAR: char = '\u{1b}';

/// Which shift key, if any, accompanies the base key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shift {
    None,
    Left,
    Right,
}

impl Shift {
    /// Returns the Linux key code of the shift key to hold, if any.
    pub fn key(self) -> Option<LinuxKey> {
        match self {
            Shift::None => None,
            Shift::Left => Some(LinuxKey::LEFTSHIFT),
            Shift::Right => Some(LinuxKey::RIGHTSHIFT),
        }
    }
}

/// A base key plus an optional shift side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombination {
    pub key: LinuxKey,
    pub shift: Shift,
}

impl KeyCombination {
    const fn plain(key: LinuxKey) -> Option<Self> {
        Some(Self { key, shift: Shift::None })
    }

    const fn left(key: LinuxKey) -> Option<Self> {
        Some(Self { key, shift: Shift::Left })
    }

    const fn right(key: LinuxKey) -> Option<Self> {
        Some(Self { key, shift: Shift::Right })
    }
}

/// Errors produced by [`translate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranslateError {
    #[error("character code {0} is outside the 7-bit range")]
    OutOfRange(u32),

    #[error("character code {0} has no key on a US keyboard")]
    NoKey(u32),
}

/// Translates one character to the key combination that types it.
///
/// # Errors
///
/// Returns [`TranslateError::OutOfRange`] for code points above 127 and
/// [`TranslateError::NoKey`] for control characters other than newline and
/// escape, and for DEL.
pub fn translate(c: char) -> Result<KeyCombination, TranslateError> {
    let code = c as u32;
    if code > MAX_ASCII_CHAR {
        return Err(TranslateError::OutOfRange(code));
    }
    ASCII_TABLE[code as usize].ok_or(TranslateError::NoKey(code))
}

/// Character → key combination table indexed by ASCII code (0–127).
const ASCII_TABLE: [Option<KeyCombination>; 128] = {
    use KeyCombination as K;
    type L = LinuxKey;
    let mut t: [Option<KeyCombination>; 128] = [None; 128];

    t[b'\n' as usize] = K::plain(L::ENTER);
    t[0x1b] = K::plain(L::BACKSPACE);
    t[b' ' as usize] = K::plain(L::SPACE);

    // Punctuation and symbols
    t[b'!' as usize] = K::right(L::KEY_1);
    t[b'"' as usize] = K::left(L::APOSTROPHE);
    t[b'#' as usize] = K::right(L::KEY_3);
    t[b'$' as usize] = K::right(L::KEY_4);
    t[b'%' as usize] = K::right(L::KEY_5);
    t[b'&' as usize] = K::left(L::KEY_7);
    t[b'\'' as usize] = K::plain(L::APOSTROPHE);
    t[b'(' as usize] = K::left(L::KEY_9);
    t[b')' as usize] = K::left(L::KEY_0);
    t[b'*' as usize] = K::left(L::KEY_8);
    t[b'+' as usize] = K::left(L::EQUAL);
    t[b',' as usize] = K::plain(L::COMMA);
    t[b'-' as usize] = K::plain(L::MINUS);
    t[b'.' as usize] = K::plain(L::DOT);
    t[b'/' as usize] = K::plain(L::SLASH);
    t[b':' as usize] = K::left(L::SEMICOLON);
    t[b';' as usize] = K::plain(L::SEMICOLON);
    t[b'<' as usize] = K::left(L::COMMA);
    t[b'=' as usize] = K::plain(L::EQUAL);
    t[b'>' as usize] = K::left(L::DOT);
    t[b'?' as usize] = K::left(L::SLASH);
    t[b'@' as usize] = K::right(L::KEY_2);
    t[b'[' as usize] = K::plain(L::LEFTBRACE);
    t[b'\\' as usize] = K::plain(L::BACKSLASH);
    t[b']' as usize] = K::plain(L::RIGHTBRACE);
    t[b'^' as usize] = K::left(L::KEY_6);
    t[b'_' as usize] = K::left(L::MINUS);
    t[b'`' as usize] = K::plain(L::GRAVE);
    t[b'{' as usize] = K::left(L::LEFTBRACE);
    t[b'|' as usize] = K::left(L::BACKSLASH);
    t[b'}' as usize] = K::left(L::RIGHTBRACE);
    t[b'~' as usize] = K::left(L::GRAVE);

    // Digits
    t[b'0' as usize] = K::plain(L::KEY_0);
    t[b'1' as usize] = K::plain(L::KEY_1);
    t[b'2' as usize] = K::plain(L::KEY_2);
    t[b'3' as usize] = K::plain(L::KEY_3);
    t[b'4' as usize] = K::plain(L::KEY_4);
    t[b'5' as usize] = K::plain(L::KEY_5);
    t[b'6' as usize] = K::plain(L::KEY_6);
    t[b'7' as usize] = K::plain(L::KEY_7);
    t[b'8' as usize] = K::plain(L::KEY_8);
    t[b'9' as usize] = K::plain(L::KEY_9);

    // Letters: lowercase plain, uppercase with the shift of the opposite hand
    let letters: [LinuxKey; 26] = [
        L::A, L::B, L::C, L::D, L::E, L::F, L::G, L::H, L::I, L::J, L::K, L::L, L::M,
        L::N, L::O, L::P, L::Q, L::R, L::S, L::T, L::U, L::V, L::W, L::X, L::Y, L::Z,
    ];
    let mut i = 0;
    while i < 26 {
        let key = letters[i];
        t[b'a' as usize + i] = K::plain(key);
        t[b'A' as usize + i] = match b'A' + i as u8 {
            b'H'..=b'P' | b'U' | b'Y' => K::left(key),
            _ => K::right(key),
        };
        i += 1;
    }

    t
};
