//! Keymap cycling
//!
//! The host decides which layout it applies to incoming scancodes; we can
//! only rotate it by pressing the configured shortcut. The cycler mirrors
//! the host's position in the keymap order so that a character missing from
//! the active keymap can be looked up in the next ones, and so the host can be
//! put back on the first keymap when the run ends.

use crate::error::EncodeError;
use hidtype_keymap::{Keymap, KeymapStore};
use hidtype_transport::{hold, press, MemorySink, Pacer, Report, ReportSink, SinkError};
use std::time::Duration;
use tracing::debug;

/// Cursor into the keymap order, plus the shortcut that advances it
#[derive(Debug, Clone)]
pub struct Cycler {
    order: Vec<String>,
    shortcut: Report,
    current: usize,
    presses: usize,
}

impl Cycler {
    /// Fails with [`EncodeError::NoKeymaps`] for an empty `order`
    pub fn new(order: Vec<String>, shortcut: Report) -> Result<Self, EncodeError> {
        if order.is_empty() {
            return Err(EncodeError::NoKeymaps);
        }
        Ok(Self {
            order,
            shortcut,
            current: 0,
            presses: 0,
        })
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Index of the keymap the host is assumed to be using
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_name(&self) -> &str {
        &self.order[self.current]
    }

    /// Shortcut presses sent to the live sink so far
    pub fn shortcut_presses(&self) -> usize {
        self.presses
    }

    /// The active keymap, if it loads
    pub fn active_keymap<'s>(&self, store: &'s mut KeymapStore) -> Option<&'s Keymap> {
        store.get(&self.order[self.current])
    }

    fn advance(&mut self) {
        self.current = (self.current + 1) % self.order.len();
    }

    /// Rotate through the keymap order until one contains `ch`.
    ///
    /// Shortcut presses are staged in memory and only written to `sink` once
    /// a keymap with `ch` is found. After a full unsuccessful cycle nothing
    /// has been written and `false` is returned.
    pub fn find_keymap_for(
        &mut self,
        ch: char,
        store: &mut KeymapStore,
        sink: &mut dyn ReportSink,
    ) -> Result<bool, SinkError> {
        let mut staged = MemorySink::with_capacity(2 * Report::LEN * self.order.len());
        for switches in 0..self.order.len() {
            if self.active_keymap(store).is_some_and(|km| km.contains(ch)) {
                staged.drain_into(sink)?;
                self.presses += switches;
                if switches > 0 {
                    debug!(
                        "Switched to keymap {} for {ch:?} ({switches} presses)",
                        self.current_name()
                    );
                }
                return Ok(true);
            }
            hold(&mut staged, &self.shortcut)?;
            hold(&mut staged, &Report::RELEASE)?;
            self.advance();
        }
        debug!("{ch:?} not found in any keymap");
        Ok(false)
    }

    /// Bring the host back to the first keymap.
    ///
    /// Presses the shortcut `order.len() - current` times on the live sink.
    /// Does nothing when only one keymap is configured. Returns the number of
    /// presses sent.
    pub fn rebaseline(
        &mut self,
        sink: &mut dyn ReportSink,
        pacer: &mut dyn Pacer,
        release_delay: Duration,
    ) -> Result<usize, SinkError> {
        if self.order.len() <= 1 {
            return Ok(0);
        }
        let count = self.order.len() - self.current;
        for _ in 0..count {
            press(sink, pacer, &self.shortcut, release_delay)?;
            self.presses += 1;
        }
        debug!("Restored keymap {} ({count} presses)", self.order[0]);
        self.current = 0;
        Ok(count)
    }
}
