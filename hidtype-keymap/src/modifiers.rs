//! Modifier name resolution
//!
//! Keymap files name modifiers with the canonical `LCTRL`/`LSHIFT`/... names
//! from [`mods::NAMES`], or `NONE`. [`resolve`] turns such a list into the
//! report's modifier byte and ignores every other name, aliases included.
//! [`parse_modifier`] is the strict lookup used for user-supplied shortcut
//! strings and also accepts the usual aliases.

use hidtype_transport::mods;
use tracing::trace;

/// Look up a single modifier name (case-insensitive).
///
/// Accepts the canonical names, `NONE`, and the usual aliases (`ctrl`,
/// `shift`, `alt`, `gui`/`win`/`super`, `altgr`, ...).
pub fn parse_modifier(name: &str) -> Option<u8> {
    match name.trim().to_ascii_lowercase().as_str() {
        "none" => Some(mods::NONE),
        "lctrl" | "ctrl" | "control" | "lcontrol" => Some(mods::LCTRL),
        "lshift" | "shift" | "lshf" => Some(mods::LSHIFT),
        "lalt" | "alt" | "option" | "loption" => Some(mods::LALT),
        "lsuper" | "super" | "gui" | "lgui" | "win" | "lwin" | "cmd" => Some(mods::LSUPER),
        "rctrl" | "rcontrol" => Some(mods::RCTRL),
        "rshift" | "rshf" => Some(mods::RSHIFT),
        "ralt" | "altgr" | "roption" => Some(mods::RALT),
        "rsuper" | "rgui" | "rwin" | "rcmd" => Some(mods::RSUPER),
        _ => None,
    }
}

/// Bit for a canonical modifier name or `NONE` (case-insensitive)
fn canonical_bit(name: &str) -> Option<u8> {
    if name.eq_ignore_ascii_case("NONE") {
        return Some(mods::NONE);
    }
    mods::NAMES
        .iter()
        .find(|(_, canonical)| canonical.eq_ignore_ascii_case(name))
        .map(|&(bit, _)| bit)
}

/// OR together the bits of every canonically named modifier. Any other name
/// contributes nothing.
pub fn resolve<S: AsRef<str>>(names: &[S]) -> u8 {
    names.iter().fold(mods::NONE, |bits, name| {
        let name = name.as_ref();
        match canonical_bit(name) {
            Some(bit) => bits | bit,
            None => {
                trace!("ignoring unknown modifier {name:?}");
                bits
            }
        }
    })
}
