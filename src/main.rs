//! hidtype CLI
//!
//! Reads text from stdin (or a file) and types it through a USB HID keyboard
//! gadget.

use anyhow::Context;
use clap::Parser;
use hidtype::keymap::{BuiltinLoader, FallbackLoader, JsonKeymapLoader, KeymapStore};
use hidtype::transport::{
    DeviceSink, PrinterConfig, PrinterSink, ReportSink, ThreadPacer, WriterSink,
};
use hidtype::{Config, Encoder};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tracing::{debug, info};

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hidtype=info")),
        )
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(&config_path)?;
    cli.apply(&mut config);
    debug!("Config: {config:?}");

    let options = config.encoder_options()?;
    let keymap_dir = config.keymap_dir();
    info!(
        "Keymaps {:?} from {}",
        options.keymap_order,
        keymap_dir.display()
    );
    let store = KeymapStore::new(FallbackLoader::new(
        JsonKeymapLoader::new(keymap_dir),
        BuiltinLoader,
    ));

    let sink: Box<dyn ReportSink> = if cli.dry_run {
        Box::new(WriterSink::new(io::stdout().lock()))
    } else {
        Box::new(DeviceSink::open(&config.device)?)
    };
    let sink: Box<dyn ReportSink> = if cli.monitor {
        info!("Monitor mode enabled - printing all reports");
        Box::new(PrinterSink::wrap(sink, PrinterConfig::default().with_hex(cli.hex)))
    } else {
        sink
    };

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut encoder = Encoder::new(options, store, sink, ThreadPacer)?;
    let summary = encoder.encode_reader(input)?;
    if summary.skipped > 0 {
        info!("{} characters were not in any keymap", summary.skipped);
    }

    Ok(())
}
