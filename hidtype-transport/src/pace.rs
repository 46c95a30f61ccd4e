//! Timed waits between reports

use std::time::Duration;

/// Blocks the caller for a requested duration.
pub trait Pacer {
    fn pause(&mut self, duration: Duration);
}

/// Sleeps the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Records requested pauses without sleeping
#[derive(Debug, Default, Clone)]
pub struct RecordingPacer {
    pauses: Vec<Duration>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> &[Duration] {
        &self.pauses
    }
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn pause(&mut self, duration: Duration) {
        (**self).pause(duration)
    }
}
