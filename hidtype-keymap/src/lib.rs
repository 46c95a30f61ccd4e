//! Keymaps for hidtype
//!
//! A keymap maps single characters to [`Key`] descriptors: a scancode plus
//! modifier names, or one of the in-band directive markers. Keymaps are
//! loaded by name through a [`KeymapLoader`] and cached in a [`KeymapStore`].

pub mod builtin;
pub mod error;
pub mod hid_codes;
pub mod key;
pub mod loader;
pub mod modifiers;
pub mod store;

pub use error::KeymapError;
pub use key::{Key, Keymap};
pub use loader::{
    default_keymap_dir, BuiltinLoader, FallbackLoader, JsonKeymapLoader, KeymapLoader,
    StaticLoader,
};
pub use modifiers::{parse_modifier, resolve};
pub use store::KeymapStore;
