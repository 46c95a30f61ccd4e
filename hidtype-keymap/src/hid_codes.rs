//! Named HID keyboard usages (usage page 0x07)

/// Keyboard a and A; the letters follow contiguously up to z (0x1D)
pub const LETTER_A: u8 = 0x04;
/// Enter / Return
pub const ENTER: u8 = 0x28;
/// Tab
pub const TAB: u8 = 0x2B;
/// Space bar
pub const SPACE: u8 = 0x2C;
/// Caps Lock
pub const CAPS_LOCK: u8 = 0x39;
