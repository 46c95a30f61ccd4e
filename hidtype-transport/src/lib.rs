//! Output side of hidtype: the HID boot-keyboard report and the sinks it is
//! written to.
//!
//! - [`Report`]: the 8-byte boot protocol report (modifier, reserved, 6 keys)
//! - [`ReportSink`]: anything that accepts raw report bytes, with an optional
//!   [`Syncable`] capability used before timed releases
//! - [`DeviceSink`], [`WriterSink`], [`MemorySink`]: concrete sinks
//! - [`PrinterSink`]: middleware that prints every report passing through
//! - [`press`], [`hold`], [`settle`]: keystroke helpers built on top of a sink

pub mod error;
pub mod keystroke;
pub mod pace;
pub mod printer;
pub mod report;
pub mod sink;

pub use error::SinkError;
pub use keystroke::{hold, press, settle};
pub use pace::{Pacer, RecordingPacer, ThreadPacer};
pub use printer::{PrinterConfig, PrinterSink};
pub use report::{mods, Report};
pub use sink::{DeviceSink, MemorySink, ReportSink, Syncable, WriterSink};

/// Default HID gadget device node
pub const DEFAULT_DEVICE: &str = "/dev/hidg0";
