//! Encoder error types

use hidtype_transport::SinkError;
use thiserror::Error;

/// Errors that abort an encoding run
#[derive(Error, Debug)]
pub enum EncodeError {
    /// Input is not valid UTF-8 at `offset`
    #[error("Invalid UTF-8 at byte {offset}: 0x{byte:02X}")]
    Decode { offset: usize, byte: u8 },

    /// Character missing from every configured keymap
    #[error("Character {ch:?} at byte {offset} is not in any keymap")]
    UnknownCharacter { ch: char, offset: usize },

    #[error("No keymaps configured")]
    NoKeymaps,

    #[error("Failed to read input: {0}")]
    Input(#[source] std::io::Error),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl EncodeError {
    /// Move the byte offset of a positioned error forward by `base`
    pub(crate) fn offset_by(self, base: usize) -> Self {
        match self {
            Self::Decode { offset, byte } => Self::Decode {
                offset: base + offset,
                byte,
            },
            Self::UnknownCharacter { ch, offset } => Self::UnknownCharacter {
                ch,
                offset: base + offset,
            },
            other => other,
        }
    }
}
