//! Key descriptors and keymaps
//!
//! # JSON format
//!
//! ```text
//! {
//!   "a": { "modifier": [],         "decimal": 4 },
//!   "A": { "modifier": ["LSHIFT"], "decimal": 4 },
//!   "⌛": { "pressDelayDelimiter": true },
//!   "⏱": { "releaseDelayDelimiter": true },
//!   "⍝": { "comment": true }
//! }
//! ```
//!
//! At most one of the three marker flags may be set, and a marker entry may
//! not carry a scancode.

use crate::error::KeymapError;
use crate::modifiers::resolve;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a character in a keymap stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A keystroke. `scancode == 0` is a modifier-only key (e.g. a bare Shift).
    Character { scancode: u8, modifiers: Vec<String> },
    /// Following digits set the delay between successive reports (ms)
    PressDelay,
    /// Following digits set the delay between a press and its release (ms)
    ReleaseDelay,
    /// Rest of the line is ignored
    Comment,
}

impl Key {
    /// Plain keystroke without modifiers
    pub fn plain(scancode: u8) -> Self {
        Key::Character {
            scancode,
            modifiers: Vec::new(),
        }
    }

    /// Keystroke with the given modifier names
    pub fn with_modifiers<S: Into<String>>(
        scancode: u8,
        modifiers: impl IntoIterator<Item = S>,
    ) -> Self {
        Key::Character {
            scancode,
            modifiers: modifiers.into_iter().map(Into::into).collect(),
        }
    }

    /// Modifier bitmask (zero for markers)
    pub fn modifier_bits(&self) -> u8 {
        match self {
            Key::Character { modifiers, .. } => resolve(modifiers.as_slice()),
            _ => 0,
        }
    }

    /// True for a character key with no scancode
    pub fn is_modifier_only(&self) -> bool {
        matches!(self, Key::Character { scancode: 0, .. })
    }
}

/// On-disk representation of a [`Key`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonKey {
    /// `null` is accepted and treated as empty
    #[serde(default)]
    modifier: Option<Vec<String>>,
    #[serde(default)]
    decimal: u8,
    #[serde(default, skip_serializing_if = "is_false")]
    press_delay_delimiter: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    release_delay_delimiter: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    comment: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl JsonKey {
    fn into_key(self, ch: char) -> Result<Key, KeymapError> {
        let markers = [
            self.press_delay_delimiter,
            self.release_delay_delimiter,
            self.comment,
        ];
        match markers.iter().filter(|&&set| set).count() {
            0 => {
                return Ok(Key::Character {
                    scancode: self.decimal,
                    modifiers: self.modifier.unwrap_or_default(),
                })
            }
            1 => {}
            _ => {
                return Err(KeymapError::InvalidEntry {
                    key: ch,
                    reason: "more than one marker flag set",
                })
            }
        }
        if self.decimal != 0 {
            return Err(KeymapError::InvalidEntry {
                key: ch,
                reason: "marker entry has a scancode",
            });
        }
        Ok(if self.press_delay_delimiter {
            Key::PressDelay
        } else if self.release_delay_delimiter {
            Key::ReleaseDelay
        } else {
            Key::Comment
        })
    }
}

impl From<&Key> for JsonKey {
    fn from(key: &Key) -> Self {
        match key {
            Key::Character {
                scancode,
                modifiers,
            } => JsonKey {
                modifier: Some(modifiers.clone()),
                decimal: *scancode,
                ..Default::default()
            },
            Key::PressDelay => JsonKey {
                press_delay_delimiter: true,
                ..Default::default()
            },
            Key::ReleaseDelay => JsonKey {
                release_delay_delimiter: true,
                ..Default::default()
            },
            Key::Comment => JsonKey {
                comment: true,
                ..Default::default()
            },
        }
    }
}

/// Mapping from a character to the [`Key`] that produces it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keymap {
    keys: HashMap<char, Key>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a keymap from its JSON document
    pub fn from_json(json: &str) -> Result<Self, KeymapError> {
        let raw: HashMap<String, JsonKey> = serde_json::from_str(json)?;
        let mut keys = HashMap::with_capacity(raw.len());
        for (name, entry) in raw {
            let mut chars = name.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => return Err(KeymapError::InvalidKey(name)),
            };
            keys.insert(ch, entry.into_key(ch)?);
        }
        Ok(Self { keys })
    }

    /// Serialize to the JSON document format
    pub fn to_json_pretty(&self) -> Result<String, KeymapError> {
        let raw: HashMap<String, JsonKey> = self
            .keys
            .iter()
            .map(|(ch, key)| (ch.to_string(), JsonKey::from(key)))
            .collect();
        Ok(serde_json::to_string_pretty(&raw)?)
    }

    pub fn insert(&mut self, ch: char, key: Key) -> Option<Key> {
        self.keys.insert(ch, key)
    }

    pub fn get(&self, ch: char) -> Option<&Key> {
        self.keys.get(&ch)
    }

    pub fn contains(&self, ch: char) -> bool {
        self.keys.contains_key(&ch)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<(char, Key)> for Keymap {
    fn from_iter<I: IntoIterator<Item = (char, Key)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidtype_transport::mods;

    #[test]
    fn parse_characters_and_markers() {
        let keymap = Keymap::from_json(
            r##"{
                "a": { "modifier": [], "decimal": 4 },
                "A": { "modifier": ["LSHIFT"], "decimal": 4 },
                "⌛": { "pressDelayDelimiter": true },
                "⏱": { "releaseDelayDelimiter": true },
                "#": { "comment": true }
            }"##,
        )
        .unwrap();

        assert_eq!(keymap.len(), 5);
        assert_eq!(keymap.get('a'), Some(&Key::plain(0x04)));
        assert_eq!(keymap.get('A').unwrap().modifier_bits(), mods::LSHIFT);
        assert_eq!(keymap.get('⌛'), Some(&Key::PressDelay));
        assert_eq!(keymap.get('⏱'), Some(&Key::ReleaseDelay));
        assert_eq!(keymap.get('#'), Some(&Key::Comment));
        assert!(keymap.get('b').is_none());
    }

    #[test]
    fn missing_and_null_fields_default() {
        let keymap = Keymap::from_json(
            r#"{ "⇧": { "modifier": ["LSHIFT"] }, "x": { "modifier": null, "decimal": 27 } }"#,
        )
        .unwrap();
        let shift = keymap.get('⇧').unwrap();
        assert!(shift.is_modifier_only());
        assert_eq!(shift.modifier_bits(), mods::LSHIFT);
        assert_eq!(keymap.get('x'), Some(&Key::plain(27)));
    }

    #[test]
    fn multi_character_key_is_rejected() {
        let err = Keymap::from_json(r#"{ "ab": { "decimal": 4 } }"#).unwrap_err();
        assert!(matches!(err, KeymapError::InvalidKey(k) if k == "ab"));
        assert!(Keymap::from_json(r#"{ "": { "decimal": 4 } }"#).is_err());
    }

    #[test]
    fn conflicting_markers_are_rejected() {
        let err =
            Keymap::from_json(r#"{ "x": { "comment": true, "pressDelayDelimiter": true } }"#)
                .unwrap_err();
        assert!(matches!(err, KeymapError::InvalidEntry { key: 'x', .. }));
    }

    #[test]
    fn marker_with_scancode_is_rejected() {
        let err =
            Keymap::from_json(r#"{ "x": { "comment": true, "decimal": 4 } }"#).unwrap_err();
        assert!(matches!(err, KeymapError::InvalidEntry { key: 'x', .. }));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Keymap::from_json("{ not json"),
            Err(KeymapError::Json(_))
        ));
        assert!(Keymap::from_json(r#"{ "a": { "decimal": 300 } }"#).is_err());
    }

    #[test]
    fn json_round_trip() {
        let keymap: Keymap = [
            ('a', Key::plain(0x04)),
            ('A', Key::with_modifiers(0x04, ["LSHIFT"])),
            ('⍝', Key::Comment),
        ]
        .into_iter()
        .collect();
        let json = keymap.to_json_pretty().unwrap();
        assert!(!json.contains("releaseDelayDelimiter"));
        assert_eq!(Keymap::from_json(&json).unwrap(), keymap);
    }
}
