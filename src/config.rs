//! Configuration file
//!
//! Loaded from `$XDG_CONFIG_HOME/hidtype/config.toml` unless another path is
//! given. Every field is optional:
//!
//! ```toml
//! keymaps = ["us", "de"]
//! shortcut = "LALT+0x39"
//! keymap_dir = "/etc/hid"
//! device = "/dev/hidg0"
//! press_delay_ms = 0
//! release_delay_ms = 0
//! error_on_unknown = false
//! flush_char = "\u200B"   # "" disables
//! ```

use crate::encoder::{EncoderOptions, DEFAULT_FLUSH_CHAR};
use crate::shortcut::parse_shortcut;
use anyhow::{bail, Context};
use hidtype_keymap::{builtin, default_keymap_dir};
use hidtype_transport::DEFAULT_DEVICE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keymap names in host cycle order
    pub keymaps: Vec<String>,
    /// Shortcut that switches the host to the next keymap
    pub shortcut: String,
    /// Directory with `<name>.json` keymaps (default `$XDG_CONFIG_HOME/hid`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keymap_dir: Option<PathBuf>,
    /// HID gadget device node
    pub device: PathBuf,
    pub press_delay_ms: u64,
    pub release_delay_ms: u64,
    /// Abort on characters no keymap contains
    pub error_on_unknown: bool,
    /// Character that ends a report group without typing; empty disables
    pub flush_char: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keymaps: vec![builtin::US.to_string()],
            shortcut: "LALT+0x39".to_string(),
            keymap_dir: None,
            device: PathBuf::from(DEFAULT_DEVICE),
            press_delay_ms: 0,
            release_delay_ms: 0,
            error_on_unknown: false,
            flush_char: DEFAULT_FLUSH_CHAR.to_string(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hidtype")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config =
            toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn keymap_dir(&self) -> PathBuf {
        self.keymap_dir.clone().unwrap_or_else(default_keymap_dir)
    }

    /// Configured keymap order, or the built-in US layout when empty
    pub fn keymap_order(&self) -> Vec<String> {
        if self.keymaps.is_empty() {
            vec![builtin::US.to_string()]
        } else {
            self.keymaps.clone()
        }
    }

    pub fn flush_char(&self) -> anyhow::Result<Option<char>> {
        let mut chars = self.flush_char.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok(None),
            (Some(ch), None) => Ok(Some(ch)),
            _ => bail!("flush_char must be a single character, got {:?}", self.flush_char),
        }
    }

    pub fn encoder_options(&self) -> anyhow::Result<EncoderOptions> {
        let shortcut = parse_shortcut(&self.shortcut)
            .with_context(|| format!("Invalid shortcut {:?}", self.shortcut))?;
        Ok(EncoderOptions {
            keymap_order: self.keymap_order(),
            shortcut,
            press_delay: Duration::from_millis(self.press_delay_ms),
            release_delay: Duration::from_millis(self.release_delay_ms),
            error_on_unknown: self.error_on_unknown,
            flush_char: self.flush_char()?,
        })
    }
}
