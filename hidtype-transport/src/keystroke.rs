//! Keystroke helpers on top of a [`ReportSink`]

use crate::error::SinkError;
use crate::pace::Pacer;
use crate::report::Report;
use crate::sink::ReportSink;
use std::time::Duration;
use tracing::trace;

/// Press and release: write `report`, wait `release_delay`, write the
/// all-zero release report.
///
/// A non-zero delay syncs the sink first when it supports it.
pub fn press(
    sink: &mut dyn ReportSink,
    pacer: &mut dyn Pacer,
    report: &Report,
    release_delay: Duration,
) -> Result<(), SinkError> {
    trace!("press {report}");
    sink.write_report(report)?;
    settle(sink, pacer, release_delay)?;
    sink.write_report(&Report::RELEASE)
}

/// Write `report` without releasing it
pub fn hold(sink: &mut dyn ReportSink, report: &Report) -> Result<(), SinkError> {
    trace!("hold {report}");
    sink.write_report(report)
}

/// Sync the sink if it can, then wait `delay`. No-op for a zero delay.
pub fn settle(
    sink: &mut dyn ReportSink,
    pacer: &mut dyn Pacer,
    delay: Duration,
) -> Result<(), SinkError> {
    if delay.is_zero() {
        return Ok(());
    }
    if let Some(syncable) = sink.as_syncable() {
        syncable.sync()?;
    }
    pacer.pause(delay);
    Ok(())
}
