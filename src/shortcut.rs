//! Keymap-cycle shortcut parsing
//!
//! # Syntax
//!
//! ```text
//! LALT+0x39        → Left Alt + Caps Lock
//! Ctrl+Shift+57    → scancodes in decimal or hex
//! LALT+LSHIFT      → modifier-only chord
//! Super+Space      → a few keys by name (Space, Tab, Enter, CapsLock)
//! ```

use hidtype_keymap::hid_codes::{CAPS_LOCK, ENTER, SPACE, TAB};
use hidtype_keymap::parse_modifier;
use hidtype_transport::{mods, Report};
use thiserror::Error;

/// Left Alt + Caps Lock
pub const DEFAULT_SHORTCUT: Report = Report::new(mods::LALT, [CAPS_LOCK, 0, 0, 0, 0, 0]);

/// Error type for parsing a shortcut
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortcutError {
    #[error("empty shortcut")]
    Empty,

    #[error("unknown shortcut token \"{0}\" (expected a modifier or scancode)")]
    UnknownToken(String),

    #[error("shortcut has more than 6 keys")]
    TooManyKeys,

    #[error("scancode 0x{0:02X} appears twice in shortcut")]
    DuplicateKey(u8),
}

/// Parse a `+`-separated shortcut into the report that presses it
pub fn parse_shortcut(s: &str) -> Result<Report, ShortcutError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ShortcutError::Empty);
    }

    let mut report = Report::default();
    let mut modifier = mods::NONE;
    let mut slot = 0;
    for token in s.split('+') {
        let token = token.trim();
        if let Some(bit) = parse_modifier(token) {
            modifier |= bit;
            continue;
        }
        let code = parse_scancode(token)
            .ok_or_else(|| ShortcutError::UnknownToken(token.to_string()))?;
        if report.contains(code) {
            return Err(ShortcutError::DuplicateKey(code));
        }
        if slot == Report::KEY_SLOTS {
            return Err(ShortcutError::TooManyKeys);
        }
        report.set_key(slot, code);
        slot += 1;
    }
    report.set_modifier(modifier);
    Ok(report)
}

fn parse_scancode(token: &str) -> Option<u8> {
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return u8::from_str_radix(hex, 16).ok();
    }
    if let Ok(code) = token.parse::<u8>() {
        return Some(code);
    }
    match token.to_ascii_lowercase().as_str() {
        "capslock" | "caps" => Some(CAPS_LOCK),
        "space" | "spc" => Some(SPACE),
        "tab" => Some(TAB),
        "enter" | "return" => Some(ENTER),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shortcut_text() {
        assert_eq!(parse_shortcut("LALT+0x39").unwrap(), DEFAULT_SHORTCUT);
        assert_eq!(parse_shortcut("alt + capslock").unwrap(), DEFAULT_SHORTCUT);
        assert_eq!(parse_shortcut("LALT+57").unwrap(), DEFAULT_SHORTCUT);
    }

    #[test]
    fn modifier_only_chord() {
        let report = parse_shortcut("LALT+LSHIFT").unwrap();
        assert_eq!(report.modifier(), mods::LALT | mods::LSHIFT);
        assert_eq!(report.pressed().count(), 0);
    }

    #[test]
    fn multiple_keys() {
        let report = parse_shortcut("Super+Space+0x04").unwrap();
        assert_eq!(report.to_bytes(), [mods::LSUPER, 0, SPACE, 0x04, 0, 0, 0, 0]);
    }

    #[test]
    fn errors() {
        assert_eq!(parse_shortcut("  "), Err(ShortcutError::Empty));
        assert_eq!(
            parse_shortcut("LALT+Hyper"),
            Err(ShortcutError::UnknownToken("Hyper".into()))
        );
        assert_eq!(
            parse_shortcut("LALT++"),
            Err(ShortcutError::UnknownToken(String::new()))
        );
        assert_eq!(
            parse_shortcut("0x39+57"),
            Err(ShortcutError::DuplicateKey(0x39))
        );
        assert_eq!(parse_shortcut("0x100"), Err(ShortcutError::UnknownToken("0x100".into())));
        assert_eq!(
            parse_shortcut("4+5+6+7+8+9+10"),
            Err(ShortcutError::TooManyKeys)
        );
    }
}
