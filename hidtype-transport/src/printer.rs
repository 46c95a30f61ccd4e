//! PrinterSink middleware for monitoring reports
//!
//! Wraps any [`ReportSink`] and prints every report passing through it to
//! stderr before forwarding.
//!
//! ```ignore
//! let device = DeviceSink::open("/dev/hidg0")?;
//! let monitored = PrinterSink::wrap(device, PrinterConfig::default().with_hex(true));
//! ```

use crate::error::SinkError;
use crate::report::Report;
use crate::sink::{ReportSink, Syncable};

/// Configuration for the PrinterSink
#[derive(Debug, Clone, Default)]
pub struct PrinterConfig {
    /// Show raw hex alongside decoded output
    pub show_hex: bool,
}

impl PrinterConfig {
    pub fn with_hex(mut self, show: bool) -> Self {
        self.show_hex = show;
        self
    }
}

/// Sink middleware that prints all reports
pub struct PrinterSink<S> {
    inner: S,
    config: PrinterConfig,
    count: usize,
}

impl<S: ReportSink> PrinterSink<S> {
    pub fn wrap(inner: S, config: PrinterConfig) -> Self {
        Self {
            inner,
            config,
            count: 0,
        }
    }

    /// Number of reports seen so far
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn print_report(&self, report: &Report) {
        eprintln!(">>> {:5}  {report}", self.count);
        if self.config.show_hex {
            eprintln!("    HEX  {:02x?}", report.to_bytes());
        }
    }
}

impl<S: ReportSink> ReportSink for PrinterSink<S> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        for chunk in bytes.chunks(Report::LEN) {
            match Report::parse(chunk) {
                Some(report) => self.print_report(&report),
                None => eprintln!("??? partial report {chunk:02x?}"),
            }
            self.count += 1;
        }
        self.inner.write_bytes(bytes)
    }

    fn as_syncable(&mut self) -> Option<&mut dyn Syncable> {
        self.inner.as_syncable()
    }
}
