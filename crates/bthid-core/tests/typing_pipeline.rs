//! Integration tests for the bthid-core text → report pipeline.
//!
//! These tests drive the translator, the event sequencer and the keyboard
//! state machine together through the public API, and decode the resulting
//! report bytes the way a host would.

use bthid_core::{
    protocol::report::{InputReport, ModifierFlags},
    sequence, translate, HidKeyCode, KeyEvent, KeyboardState, LinuxKey,
    MAX_EVENTS_PER_COMBINATION, REPORT_LEN,
};

/// Types `text` and returns every report that would be transmitted.
fn type_text(text: &str) -> Vec<[u8; REPORT_LEN]> {
    let mut kb = KeyboardState::new();
    let mut buf = [KeyEvent::release(LinuxKey(0)); MAX_EVENTS_PER_COMBINATION];
    let mut out = Vec::new();
    for ch in text.chars() {
        let Ok(combo) = translate(ch) else { continue };
        let len = sequence(&combo, &mut buf).expect("buffer holds any combination");
        for &event in &buf[..len] {
            if kb.apply(event) {
                out.push(kb.snapshot());
            }
        }
    }
    out
}

fn decode(bytes: &[u8; REPORT_LEN]) -> InputReport {
    InputReport::decode(bytes).expect("every report has the fixed header")
}

#[test]
fn test_hi_newline_produces_expected_report_sequence() {
    // Arrange / Act
    let reports: Vec<InputReport> = type_text("Hi\n").iter().map(decode).collect();

    // Assert
    let h = HidKeyCode::KeyH.as_u8();
    let i = HidKeyCode::KeyI.as_u8();
    let enter = HidKeyCode::Enter.as_u8();
    let shift = ModifierFlags(ModifierFlags::LEFT_SHIFT);
    let none = ModifierFlags::default();
    let expected = vec![
        InputReport { modifiers: shift, keys: [0; 6] },
        InputReport { modifiers: shift, keys: [h, 0, 0, 0, 0, 0] },
        InputReport { modifiers: shift, keys: [0; 6] },
        InputReport { modifiers: none, keys: [0; 6] },
        InputReport { modifiers: none, keys: [i, 0, 0, 0, 0, 0] },
        InputReport { modifiers: none, keys: [0; 6] },
        InputReport { modifiers: none, keys: [enter, 0, 0, 0, 0, 0] },
        InputReport { modifiers: none, keys: [0; 6] },
    ];
    assert_eq!(reports, expected);
}

#[test]
fn test_escape_preamble_types_backspace_pairs() {
    // Arrange
    let preamble: String = std::iter::repeat('\u{1b}').take(10).collect();

    // Act
    let reports = type_text(&preamble);

    // Assert
    assert_eq!(reports.len(), 20);
    for pair in reports.chunks(2) {
        assert_eq!(decode(&pair[0]).keys[0], HidKeyCode::Backspace.as_u8());
        assert_eq!(decode(&pair[1]).keys, [0; 6]);
    }
}

#[test]
fn test_untranslatable_characters_produce_no_reports() {
    assert!(type_text("\t\r\u{7f}é€").is_empty());
}

#[test]
fn test_every_report_has_constant_header_and_length() {
    let all_printables: String = (32u8..=126).map(char::from).collect();

    let reports = type_text(&all_printables);

    assert!(!reports.is_empty());
    for r in &reports {
        assert_eq!(r.len(), REPORT_LEN);
        assert_eq!(r[0], 0xA1);
        assert_eq!(r[1], 0x01);
        assert_eq!(r[3], 0x00);
    }
}

#[test]
fn test_typing_always_returns_to_idle_keyboard() {
    let text = "Pack my box with five dozen liquor jugs! (#42) ~_~";

    let reports = type_text(text);

    let last = decode(reports.last().expect("text produces reports"));
    assert!(last.modifiers.is_empty());
    assert_eq!(last.keys, [0; 6]);
}

#[test]
fn test_shift_side_is_visible_in_modifier_byte() {
    let a = type_text("A");
    let h = type_text("H");

    assert_eq!(decode(&a[0]).modifiers.0, ModifierFlags::RIGHT_SHIFT);
    assert_eq!(decode(&h[0]).modifiers.0, ModifierFlags::LEFT_SHIFT);
}
