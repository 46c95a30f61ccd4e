//! Report sinks
//!
//! A sink receives raw report bytes. Sinks that can flush pending writes to
//! the device before a timed wait also expose [`Syncable`] through
//! [`ReportSink::as_syncable`]; callers branch on that instead of inspecting
//! the concrete type.

use crate::error::SinkError;
use crate::report::Report;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;
use zerocopy::IntoBytes;

/// Destination for report bytes
pub trait ReportSink {
    /// Write raw bytes (one or more whole reports)
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError>;

    /// Write a single report
    fn write_report(&mut self, report: &Report) -> Result<(), SinkError> {
        self.write_bytes(report.as_bytes())
    }

    /// The sync capability, if this sink has one
    fn as_syncable(&mut self) -> Option<&mut dyn Syncable> {
        None
    }
}

/// Capability to synchronize pending writes with the device
pub trait Syncable {
    fn sync(&mut self) -> Result<(), SinkError>;
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        (**self).write_bytes(bytes)
    }

    fn as_syncable(&mut self) -> Option<&mut dyn Syncable> {
        (**self).as_syncable()
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        (**self).write_bytes(bytes)
    }

    fn as_syncable(&mut self) -> Option<&mut dyn Syncable> {
        (**self).as_syncable()
    }
}

// =============================================================================
// Device
// =============================================================================

/// HID gadget device node (e.g. `/dev/hidg0`), with sync support
pub struct DeviceSink {
    file: File,
}

impl DeviceSink {
    /// Open a gadget device for writing
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|source| SinkError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Opened {}", path.display());
        Ok(Self { file })
    }
}

impl ReportSink for DeviceSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.file.write_all(bytes).map_err(SinkError::Write)
    }

    fn as_syncable(&mut self) -> Option<&mut dyn Syncable> {
        Some(self)
    }
}

impl Syncable for DeviceSink {
    fn sync(&mut self) -> Result<(), SinkError> {
        match self.file.sync_data() {
            Ok(()) => Ok(()),
            // Character devices commonly reject fsync with EINVAL
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(SinkError::Sync(e)),
        }
    }
}

// =============================================================================
// Generic writer
// =============================================================================

/// Plain byte sink over any [`Write`]; flushes after every write, no sync
pub struct WriterSink<W: Write> {
    inner: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.inner.write_all(bytes).map_err(SinkError::Write)?;
        self.inner.flush().map_err(SinkError::Write)
    }
}

// =============================================================================
// In-memory buffer
// =============================================================================

/// Growable in-memory sink.
///
/// Used to stage writes that may later be discarded, and by tests to capture
/// output.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    buf: Vec<u8>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Buffered bytes split into reports. A trailing partial report is dropped.
    pub fn reports(&self) -> Vec<Report> {
        self.buf
            .chunks_exact(Report::LEN)
            .filter_map(Report::parse)
            .collect()
    }

    /// Write everything buffered to `sink` in a single write and clear the buffer
    pub fn drain_into(&mut self, sink: &mut dyn ReportSink) -> Result<(), SinkError> {
        if self.buf.is_empty() {
            return Ok(());
        }
        sink.write_bytes(&self.buf)?;
        self.buf.clear();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl ReportSink for MemorySink {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}
