//! HID boot-keyboard report (USB HID Spec 1.11, Appendix B.1)

use std::fmt;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Modifier bitmask constants for byte 0 of the report.
///
/// Bit positions follow HID usages 0xE0-0xE7.
pub mod mods {
    pub const NONE: u8 = 0x00;
    pub const LCTRL: u8 = 0x01;
    pub const LSHIFT: u8 = 0x02;
    pub const LALT: u8 = 0x04;
    pub const LSUPER: u8 = 0x08;
    pub const RCTRL: u8 = 0x10;
    pub const RSHIFT: u8 = 0x20;
    pub const RALT: u8 = 0x40;
    pub const RSUPER: u8 = 0x80;

    /// Canonical names, in bit order.
    pub const NAMES: [(u8, &str); 8] = [
        (LCTRL, "LCTRL"),
        (LSHIFT, "LSHIFT"),
        (LALT, "LALT"),
        (LSUPER, "LSUPER"),
        (RCTRL, "RCTRL"),
        (RSHIFT, "RSHIFT"),
        (RALT, "RALT"),
        (RSUPER, "RSUPER"),
    ];

    /// Names of the bits set in `bits`, in bit order.
    pub fn names(bits: u8) -> Vec<&'static str> {
        NAMES
            .iter()
            .filter(|(bit, _)| bits & bit != 0)
            .map(|&(_, name)| name)
            .collect()
    }
}

/// Standard 8-byte keyboard report:
/// - Byte 0: modifier bitmask
/// - Byte 1: reserved, always zero
/// - Bytes 2-7: key slots
///
/// A slot holding zero is either unused or occupied by a modifier-only key.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable,
)]
#[repr(C)]
pub struct Report {
    modifier: u8,
    reserved: u8,
    keys: [u8; 6],
}

impl Report {
    /// Size of a report on the wire
    pub const LEN: usize = 8;

    /// Number of key slots (boot protocol rollover limit)
    pub const KEY_SLOTS: usize = 6;

    /// All keys released
    pub const RELEASE: Report = Report {
        modifier: 0,
        reserved: 0,
        keys: [0; 6],
    };

    /// Create a report from a modifier byte and key slots
    pub const fn new(modifier: u8, keys: [u8; 6]) -> Self {
        Self {
            modifier,
            reserved: 0,
            keys,
        }
    }

    /// Parse a report from raw bytes. The reserved byte is cleared.
    ///
    /// Returns `None` unless `data` is exactly [`Report::LEN`] bytes.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut report = Self::read_from_bytes(data).ok()?;
        report.reserved = 0;
        Some(report)
    }

    pub fn modifier(&self) -> u8 {
        self.modifier
    }

    pub fn set_modifier(&mut self, modifier: u8) {
        self.modifier = modifier;
    }

    pub fn keys(&self) -> &[u8; 6] {
        &self.keys
    }

    /// Store `code` in key slot `slot` (0-5).
    pub fn set_key(&mut self, slot: usize, code: u8) {
        self.keys[slot] = code;
    }

    /// Check whether a non-zero scancode is already held in the report
    pub fn contains(&self, code: u8) -> bool {
        code != 0 && self.keys.contains(&code)
    }

    /// Non-zero scancodes in slot order
    pub fn pressed(&self) -> impl Iterator<Item = u8> + '_ {
        self.keys.iter().copied().filter(|&k| k != 0)
    }

    /// True for the all-zero release report
    pub fn is_release(&self) -> bool {
        *self == Self::RELEASE
    }

    /// Raw wire bytes
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out.copy_from_slice(self.as_bytes());
        out
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_release() {
            return write!(f, "release");
        }
        let names = mods::names(self.modifier);
        if names.is_empty() {
            write!(f, "-")?;
        } else {
            write!(f, "{}", names.join("+"))?;
        }
        write!(f, " [")?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{key:02x}")?;
        }
        write!(f, "]")
    }
}
