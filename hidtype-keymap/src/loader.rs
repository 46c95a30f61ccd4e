//! Keymap loaders
//!
//! Keymap files live in `<dir>/<name>.json`; the default directory is
//! `$XDG_CONFIG_HOME/hid`.

use crate::builtin;
use crate::error::KeymapError;
use crate::key::Keymap;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Source of keymaps by name
pub trait KeymapLoader {
    fn load(&self, name: &str) -> Result<Keymap, KeymapError>;
}

impl<L: KeymapLoader + ?Sized> KeymapLoader for Box<L> {
    fn load(&self, name: &str) -> Result<Keymap, KeymapError> {
        (**self).load(name)
    }
}

/// Default keymap directory (`$XDG_CONFIG_HOME/hid`)
pub fn default_keymap_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hid")
}

/// Loads `<dir>/<name>.json`
#[derive(Debug, Clone)]
pub struct JsonKeymapLoader {
    dir: PathBuf,
}

impl JsonKeymapLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing keymap `name`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl KeymapLoader for JsonKeymapLoader {
    fn load(&self, name: &str) -> Result<Keymap, KeymapError> {
        let path = self.path_for(name);
        debug!("Loading keymap {name} from {}", path.display());
        let content = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                KeymapError::NotFound(name.to_string())
            } else {
                KeymapError::Io { path, source }
            }
        })?;
        Keymap::from_json(&content)
    }
}

/// Serves the keymaps compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLoader;

impl KeymapLoader for BuiltinLoader {
    fn load(&self, name: &str) -> Result<Keymap, KeymapError> {
        builtin::get(name).ok_or_else(|| KeymapError::NotFound(name.to_string()))
    }
}

/// In-memory keymaps
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    keymaps: HashMap<String, Keymap>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, keymap: Keymap) -> Self {
        self.keymaps.insert(name.into(), keymap);
        self
    }
}

impl KeymapLoader for StaticLoader {
    fn load(&self, name: &str) -> Result<Keymap, KeymapError> {
        self.keymaps
            .get(name)
            .cloned()
            .ok_or_else(|| KeymapError::NotFound(name.to_string()))
    }
}

/// Tries `primary`, then `fallback` if the primary does not have the keymap.
///
/// Only [`KeymapError::NotFound`] falls through; a keymap that exists but is
/// malformed is reported as such.
#[derive(Debug, Clone)]
pub struct FallbackLoader<A, B> {
    primary: A,
    fallback: B,
}

impl<A, B> FallbackLoader<A, B> {
    pub fn new(primary: A, fallback: B) -> Self {
        Self { primary, fallback }
    }
}

impl<A: KeymapLoader, B: KeymapLoader> KeymapLoader for FallbackLoader<A, B> {
    fn load(&self, name: &str) -> Result<Keymap, KeymapError> {
        match self.primary.load(name) {
            Err(KeymapError::NotFound(_)) => self.fallback.load(name),
            other => other,
        }
    }
}
