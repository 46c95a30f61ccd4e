// hidtype - type text through a USB HID keyboard gadget
// Text encoder, keymap cycling and configuration

pub mod config;
pub mod cycler;
pub mod directive;
pub mod encoder;
pub mod error;
pub mod shortcut;

pub use config::Config;
pub use cycler::Cycler;
pub use encoder::{Delays, Encoder, EncoderOptions, Summary, DEFAULT_FLUSH_CHAR};
pub use error::EncodeError;
pub use shortcut::{parse_shortcut, ShortcutError, DEFAULT_SHORTCUT};

pub use hidtype_keymap as keymap;
pub use hidtype_transport as transport;
