// CLI definitions using clap

use clap::Parser;
use hidtype::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hidtype")]
#[command(author, version, about = "Type text through a USB HID keyboard gadget")]
pub struct Cli {
    /// Keymaps in the order the host cycles through them (default: us)
    #[arg(value_name = "KEYMAP")]
    pub keymaps: Vec<String>,

    /// Shortcut that switches the host to its next keymap (e.g. LALT+0x39)
    #[arg(short, long)]
    pub shortcut: Option<String>,

    /// Directory containing <KEYMAP>.json files
    #[arg(short = 'p', long = "path", value_name = "DIR")]
    pub keymap_dir: Option<PathBuf>,

    /// HID gadget device to write reports to
    #[arg(short, long, value_name = "PATH")]
    pub device: Option<PathBuf>,

    /// Read text from a file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Config file (default: $XDG_CONFIG_HOME/hidtype/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Initial delay after each key report (ms)
    #[arg(long, value_name = "MS")]
    pub press_delay: Option<u64>,

    /// Initial delay between a key report and its release (ms)
    #[arg(long, value_name = "MS")]
    pub release_delay: Option<u64>,

    /// Fail on characters that are in no keymap instead of skipping them
    #[arg(long)]
    pub error_on_unknown: bool,

    /// Print every report written
    #[arg(long)]
    pub monitor: bool,

    /// Show raw hex dump alongside decoded output
    #[arg(long)]
    pub hex: bool,

    /// Write reports to stdout instead of the device
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Override config values with the ones given on the command line
    pub fn apply(&self, config: &mut Config) {
        if !self.keymaps.is_empty() {
            config.keymaps = self.keymaps.clone();
        }
        if let Some(shortcut) = &self.shortcut {
            config.shortcut = shortcut.clone();
        }
        if let Some(dir) = &self.keymap_dir {
            config.keymap_dir = Some(dir.clone());
        }
        if let Some(device) = &self.device {
            config.device = device.clone();
        }
        if let Some(ms) = self.press_delay {
            config.press_delay_ms = ms;
        }
        if let Some(ms) = self.release_delay {
            config.release_delay_ms = ms;
        }
        if self.error_on_unknown {
            config.error_on_unknown = true;
        }
    }
}
