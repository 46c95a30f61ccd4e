//! Lazily loaded, cached keymaps

use crate::key::Keymap;
use crate::loader::KeymapLoader;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Keymaps by name, loaded on first use and kept for the session.
///
/// A keymap that fails to load is reported and treated as absent; the next
/// lookup tries the loader again. Each failing name is warned about once.
pub struct KeymapStore {
    loader: Box<dyn KeymapLoader>,
    cache: HashMap<String, Keymap>,
    reported: HashSet<String>,
}

impl KeymapStore {
    pub fn new(loader: impl KeymapLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            cache: HashMap::new(),
            reported: HashSet::new(),
        }
    }

    /// Get keymap `name`, loading it if needed
    pub fn get(&mut self, name: &str) -> Option<&Keymap> {
        if !self.cache.contains_key(name) {
            match self.loader.load(name) {
                Ok(keymap) => {
                    info!("Loaded keymap {name} ({} keys)", keymap.len());
                    self.cache.insert(name.to_string(), keymap);
                }
                Err(e) => {
                    if self.reported.insert(name.to_string()) {
                        warn!("Keymap {name} unavailable: {e}");
                    } else {
                        debug!("Keymap {name} still unavailable: {e}");
                    }
                    return None;
                }
            }
        }
        self.cache.get(name)
    }

    /// Whether `name` has been loaded successfully
    pub fn is_loaded(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }
}
