//! Keymaps compiled into the binary

use crate::hid_codes::{ENTER, LETTER_A, SPACE, TAB};
use crate::key::{Key, Keymap};

/// Name of the built-in US layout
pub const US: &str = "us";

/// Press-delay marker in built-in keymaps
pub const PRESS_DELAY_MARKER: char = '⌛';
/// Release-delay marker in built-in keymaps
pub const RELEASE_DELAY_MARKER: char = '⏱';
/// Comment marker in built-in keymaps
pub const COMMENT_MARKER: char = '⍝';

/// US ANSI keys outside the letter block: scancode, plain and shifted character
const US_SYMBOL_KEYS: [(u8, char, char); 21] = [
    (0x1E, '1', '!'),
    (0x1F, '2', '@'),
    (0x20, '3', '#'),
    (0x21, '4', '$'),
    (0x22, '5', '%'),
    (0x23, '6', '^'),
    (0x24, '7', '&'),
    (0x25, '8', '*'),
    (0x26, '9', '('),
    (0x27, '0', ')'),
    (0x2D, '-', '_'),
    (0x2E, '=', '+'),
    (0x2F, '[', '{'),
    (0x30, ']', '}'),
    (0x31, '\\', '|'),
    (0x33, ';', ':'),
    (0x34, '\'', '"'),
    (0x35, '`', '~'),
    (0x36, ',', '<'),
    (0x37, '.', '>'),
    (0x38, '/', '?'),
];

/// Built-in keymap by name
pub fn get(name: &str) -> Option<Keymap> {
    match name {
        US => Some(us()),
        _ => None,
    }
}

/// US ANSI layout: printable ASCII, newline, tab, and the directive markers
pub fn us() -> Keymap {
    let shifted = |code| Key::with_modifiers(code, ["LSHIFT"]);

    let mut keymap = Keymap::new();
    for (code, lower) in (LETTER_A..).zip('a'..='z') {
        keymap.insert(lower, Key::plain(code));
        keymap.insert(lower.to_ascii_uppercase(), shifted(code));
    }
    for (code, plain, shift) in US_SYMBOL_KEYS {
        keymap.insert(plain, Key::plain(code));
        keymap.insert(shift, shifted(code));
    }
    keymap.insert(' ', Key::plain(SPACE));
    keymap.insert('\n', Key::plain(ENTER));
    keymap.insert('\t', Key::plain(TAB));

    keymap.insert(PRESS_DELAY_MARKER, Key::PressDelay);
    keymap.insert(RELEASE_DELAY_MARKER, Key::ReleaseDelay);
    keymap.insert(COMMENT_MARKER, Key::Comment);
    keymap
}
