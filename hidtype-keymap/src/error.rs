//! Keymap error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or validating a keymap
#[derive(Error, Debug)]
pub enum KeymapError {
    /// No loader knows this keymap
    #[error("Keymap not found: {0}")]
    NotFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed keymap JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Map key is not exactly one character
    #[error("Invalid keymap key {0:?}: expected a single character")]
    InvalidKey(String),

    /// Entry sets conflicting fields
    #[error("Invalid entry for {key:?}: {reason}")]
    InvalidEntry { key: char, reason: &'static str },
}
