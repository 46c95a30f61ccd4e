//! Text → HID report encoder
//!
//! Input text is cut into groups of keys that can be held down together:
//! one report is written per group, followed by the release report.
//!
//! A group ends when
//! - six key slots are used (boot protocol rollover),
//! - the next character needs a different modifier byte,
//! - the next character's scancode is already held,
//! - the next character is missing from the active keymap,
//! - a directive or the flush character is read,
//! - a press delay is active and a non-modifier key was placed.
//!
//! A modifier-only key (scancode 0) lets the next key add its own modifiers
//! to the group, so a bare Shift followed by `A` is a single report.

use crate::cycler::Cycler;
use crate::directive::{comment_len, parse_delay};
use crate::error::EncodeError;
use crate::shortcut::DEFAULT_SHORTCUT;
use hidtype_keymap::{builtin, Key, KeymapStore};
use hidtype_transport::{press, settle, Pacer, Report, ReportSink, ThreadPacer};
use std::io::BufRead;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Ends the current group without typing anything (U+200B ZERO WIDTH SPACE)
pub const DEFAULT_FLUSH_CHAR: char = '\u{200B}';

/// Encoder settings
#[derive(Debug, Clone)]
pub struct EncoderOptions {
    /// Keymap names in the order the host cycles through them
    pub keymap_order: Vec<String>,
    /// Report that advances the host to the next keymap
    pub shortcut: Report,
    /// Initial delay between reports
    pub press_delay: Duration,
    /// Initial delay between a press and its release
    pub release_delay: Duration,
    /// Fail instead of skipping characters found in no keymap
    pub error_on_unknown: bool,
    /// Character that ends a group without typing, if any
    pub flush_char: Option<char>,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            keymap_order: vec![builtin::US.to_string()],
            shortcut: DEFAULT_SHORTCUT,
            press_delay: Duration::ZERO,
            release_delay: Duration::ZERO,
            error_on_unknown: false,
            flush_char: Some(DEFAULT_FLUSH_CHAR),
        }
    }
}

/// Current delay settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delays {
    /// Wait after each press/release pair
    pub press: Duration,
    /// Wait between a press and its release
    pub release: Duration,
}

/// Statistics for one encoding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Input bytes consumed
    pub bytes: usize,
    /// Key reports written (each followed by a release)
    pub reports: usize,
    /// Characters dropped because no keymap has them
    pub skipped: usize,
    /// Keymap shortcut presses written, including the final rebaseline
    pub shortcut_presses: usize,
}

/// Stateful text encoder writing to a [`ReportSink`]
pub struct Encoder<S, P = ThreadPacer> {
    store: KeymapStore,
    cycler: Cycler,
    delays: Delays,
    error_on_unknown: bool,
    flush_char: Option<char>,
    sink: S,
    pacer: P,
}

impl<S: ReportSink, P: Pacer> Encoder<S, P> {
    pub fn new(
        options: EncoderOptions,
        store: KeymapStore,
        sink: S,
        pacer: P,
    ) -> Result<Self, EncodeError> {
        Ok(Self {
            store,
            cycler: Cycler::new(options.keymap_order, options.shortcut)?,
            delays: Delays {
                press: options.press_delay,
                release: options.release_delay,
            },
            error_on_unknown: options.error_on_unknown,
            flush_char: options.flush_char,
            sink,
            pacer,
        })
    }

    pub fn delays(&self) -> Delays {
        self.delays
    }

    /// Index of the active keymap in the keymap order
    pub fn current_keymap_index(&self) -> usize {
        self.cycler.current_index()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn into_parts(self) -> (S, P) {
        (self.sink, self.pacer)
    }

    /// Encode text from `reader` line by line.
    ///
    /// Each line's reports are written before the next line is read, so text
    /// piped in interactively is typed as it arrives. Groups never span a
    /// line break. Error offsets count from the start of the stream.
    pub fn encode_reader<R: BufRead>(&mut self, mut reader: R) -> Result<Summary, EncodeError> {
        self.run(|enc, summary| {
            let mut line = Vec::new();
            loop {
                line.clear();
                let read = reader
                    .read_until(b'\n', &mut line)
                    .map_err(EncodeError::Input)?;
                if read == 0 {
                    return Ok(());
                }
                enc.encode_groups(&line, summary)?;
            }
        })
    }

    /// Encode `input` and write the resulting reports.
    ///
    /// The host is returned to the first keymap afterwards, also when the run
    /// fails on bad input. A sink failure is returned as is.
    pub fn encode(&mut self, input: &[u8]) -> Result<Summary, EncodeError> {
        self.run(|enc, summary| enc.encode_groups(input, summary))
    }

    fn run<F>(&mut self, body: F) -> Result<Summary, EncodeError>
    where
        F: FnOnce(&mut Self, &mut Summary) -> Result<(), EncodeError>,
    {
        let presses_before = self.cycler.shortcut_presses();
        let mut summary = Summary::default();

        match body(self, &mut summary) {
            Ok(()) => {}
            Err(e @ EncodeError::Sink(_)) => return Err(e),
            Err(e) => {
                if let Err(restore) = self.rebaseline() {
                    warn!("Failed to restore keymap {}: {restore}", self.cycler.order()[0]);
                }
                return Err(e);
            }
        }
        self.rebaseline()?;

        summary.shortcut_presses = self.cycler.shortcut_presses() - presses_before;
        info!(
            "Encoded {} bytes into {} reports ({} skipped, {} keymap presses)",
            summary.bytes, summary.reports, summary.skipped, summary.shortcut_presses
        );
        Ok(summary)
    }

    fn rebaseline(&mut self) -> Result<usize, EncodeError> {
        Ok(self
            .cycler
            .rebaseline(&mut self.sink, &mut self.pacer, self.delays.release)?)
    }

    /// Encode one chunk of input. `summary.bytes` is the chunk's stream offset.
    fn encode_groups(&mut self, input: &[u8], summary: &mut Summary) -> Result<(), EncodeError> {
        let base = summary.bytes;
        let mut pos = 0;
        while pos < input.len() {
            let group = self
                .next_group(input, &mut pos, summary)
                .map_err(|e| e.offset_by(base))?;
            if let Some(report) = group {
                trace!("group ending at byte {}: {report}", base + pos);
                press(&mut self.sink, &mut self.pacer, &report, self.delays.release)?;
                summary.reports += 1;
                settle(&mut self.sink, &mut self.pacer, self.delays.press)?;
            }
            summary.bytes = base + pos;
        }
        Ok(())
    }

    fn lookup(&mut self, ch: char) -> Option<Key> {
        self.cycler
            .active_keymap(&mut self.store)
            .and_then(|keymap| keymap.get(ch))
            .cloned()
    }

    /// Collect the next group starting at `*pos`.
    ///
    /// Advances `*pos` past everything consumed. Returns `None` when the group
    /// placed no key (directives, skipped characters, flush).
    fn next_group(
        &mut self,
        input: &[u8],
        pos: &mut usize,
        summary: &mut Summary,
    ) -> Result<Option<Report>, EncodeError> {
        let mut report = Report::default();
        let mut used = 0;
        let mut after_modifier_only = false;

        while used < Report::KEY_SLOTS && *pos < input.len() {
            let (ch, width) = decode_char(input, *pos)?;

            if self.flush_char == Some(ch) {
                *pos += width;
                break;
            }

            let mut key = self.lookup(ch);
            if key.is_none() {
                // Keys from different keymaps can't share a report
                if used > 0 {
                    break;
                }
                if self
                    .cycler
                    .find_keymap_for(ch, &mut self.store, &mut self.sink)?
                {
                    key = self.lookup(ch);
                }
            }
            let Some(key) = key else {
                if self.error_on_unknown {
                    return Err(EncodeError::UnknownCharacter { ch, offset: *pos });
                }
                debug!("Skipping {ch:?} at byte {}: not in any keymap", *pos);
                summary.skipped += 1;
                *pos += width;
                break;
            };

            let args = *pos + width;
            match key {
                Key::PressDelay => {
                    let (consumed, delay) = parse_delay(&input[args..]);
                    debug!("Press delay {delay:?}");
                    self.delays.press = delay;
                    *pos = args + consumed;
                    break;
                }
                Key::ReleaseDelay => {
                    let (consumed, delay) = parse_delay(&input[args..]);
                    debug!("Release delay {delay:?}");
                    self.delays.release = delay;
                    *pos = args + consumed;
                    break;
                }
                Key::Comment => {
                    *pos = args + comment_len(&input[args..]);
                    break;
                }
                Key::Character { scancode, .. } => {
                    let bits = key.modifier_bits();
                    let modifier = if used == 0 || bits == report.modifier() {
                        bits
                    } else if after_modifier_only {
                        report.modifier() | bits
                    } else {
                        break;
                    };
                    // A key can't be pressed while it is already down
                    if report.contains(scancode) {
                        break;
                    }

                    report.set_modifier(modifier);
                    report.set_key(used, scancode);
                    used += 1;
                    *pos = args;
                    after_modifier_only = key.is_modifier_only();

                    if !self.delays.press.is_zero() && !after_modifier_only {
                        break;
                    }
                }
            }
        }

        Ok((used > 0).then_some(report))
    }
}

/// Decode the UTF-8 scalar value starting at `offset`.
///
/// Returns the character and its encoded width.
fn decode_char(input: &[u8], offset: usize) -> Result<(char, usize), EncodeError> {
    let rest = &input[offset..];
    let lead = rest[0];
    let invalid = EncodeError::Decode { offset, byte: lead };
    let width = match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return Err(invalid),
    };
    let Some(bytes) = rest.get(..width) else {
        return Err(invalid);
    };
    match std::str::from_utf8(bytes).ok().and_then(|s| s.chars().next()) {
        Some(ch) => Ok((ch, width)),
        None => Err(invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidtype_keymap::{Keymap, StaticLoader};
    use hidtype_transport::{mods, MemorySink, RecordingPacer, SinkError, Syncable};

    const SHIFT: char = '⇧';

    fn test_keymap() -> Keymap {
        let mut keymap = builtin::us();
        keymap.insert(SHIFT, Key::with_modifiers(0, ["LSHIFT"]));
        keymap.insert('⌃', Key::with_modifiers(0, ["LCTRL"]));
        keymap
    }

    fn encoder(options: EncoderOptions) -> Encoder<MemorySink, RecordingPacer> {
        let store = KeymapStore::new(StaticLoader::new().with("us", test_keymap()));
        Encoder::new(options, store, MemorySink::new(), RecordingPacer::new()).unwrap()
    }

    fn encode(input: &str) -> Vec<Report> {
        let mut enc = encoder(EncoderOptions::default());
        enc.encode(input.as_bytes()).unwrap();
        enc.sink().reports()
    }

    fn key(modifier: u8, keys: &[u8]) -> Report {
        let mut slots = [0u8; 6];
        slots[..keys.len()].copy_from_slice(keys);
        Report::new(modifier, slots)
    }

    /// Press reports only, releases checked and stripped
    fn presses(reports: &[Report]) -> Vec<Report> {
        assert_eq!(reports.len() % 2, 0);
        reports
            .chunks(2)
            .map(|pair| {
                assert!(pair[1].is_release(), "{:?}", pair);
                pair[0]
            })
            .collect()
    }

    #[test]
    fn compatible_keys_share_a_report() {
        let reports = encode("abc");
        assert_eq!(presses(&reports), vec![key(0, &[0x04, 0x05, 0x06])]);
    }

    #[test]
    fn modifier_change_splits_groups() {
        let reports = encode("aA");
        assert_eq!(
            presses(&reports),
            vec![key(0, &[0x04]), key(mods::LSHIFT, &[0x04])]
        );
    }

    #[test]
    fn seventh_key_starts_new_group() {
        let reports = encode("abcdefg");
        assert_eq!(
            presses(&reports),
            vec![
                key(0, &[0x04, 0x05, 0x06, 0x07, 0x08, 0x09]),
                key(0, &[0x0A])
            ]
        );
    }

    #[test]
    fn repeated_key_needs_a_release() {
        let reports = encode("aab");
        assert_eq!(
            presses(&reports),
            vec![key(0, &[0x04]), key(0, &[0x04, 0x05])]
        );
    }

    #[test]
    fn modifier_only_key_merges_with_next() {
        let reports = encode("⇧a");
        assert_eq!(presses(&reports), vec![key(mods::LSHIFT, &[0x00, 0x04])]);

        // The next key's own modifiers are added to the group
        let reports = encode("⌃A");
        assert_eq!(
            presses(&reports),
            vec![key(mods::LCTRL | mods::LSHIFT, &[0x00, 0x04])]
        );
    }

    #[test]
    fn merge_applies_only_right_after_modifier_only_key() {
        // ⌃ then A merges, then b (no modifiers) no longer matches
        let reports = encode("⌃Ab");
        assert_eq!(
            presses(&reports),
            vec![key(mods::LCTRL | mods::LSHIFT, &[0x00, 0x04]), key(0, &[0x05])]
        );
    }

    #[test]
    fn flush_char_sends_bare_modifier() {
        let reports = encode("⇧\u{200B}a");
        assert_eq!(
            presses(&reports),
            vec![key(mods::LSHIFT, &[0x00]), key(0, &[0x04])]
        );
    }

    #[test]
    fn flush_char_can_be_disabled() {
        let mut enc = encoder(EncoderOptions {
            flush_char: None,
            ..Default::default()
        });
        let summary = enc.encode("a\u{200B}b".as_bytes()).unwrap();
        // No longer special: not in the keymap, so skipped
        assert_eq!(summary.skipped, 1);
        assert_eq!(presses(&enc.sink().reports()), vec![key(0, &[0x04]), key(0, &[0x05])]);
    }

    #[test]
    fn press_delay_directive() {
        let mut enc = encoder(EncoderOptions::default());
        enc.encode("⌛50\nabc".as_bytes()).unwrap();
        assert_eq!(enc.delays().press, Duration::from_millis(50));
        assert_eq!(
            presses(&enc.sink().reports()),
            vec![key(0, &[0x04]), key(0, &[0x05]), key(0, &[0x06])]
        );
        assert_eq!(enc.pacer().pauses(), &[Duration::from_millis(50); 3]);
    }

    #[test]
    fn press_delay_allows_key_after_modifier_run() {
        let mut enc = encoder(EncoderOptions {
            press_delay: Duration::from_millis(10),
            ..Default::default()
        });
        enc.encode("⌃⇧ab".as_bytes()).unwrap();
        assert_eq!(
            presses(&enc.sink().reports()),
            vec![
                key(mods::LCTRL | mods::LSHIFT, &[0x00, 0x00, 0x04]),
                key(0, &[0x05])
            ]
        );
    }

    #[test]
    fn press_delay_of_zero_restores_batching() {
        let reports = encode("⌛5\nab⌛0\ncd");
        assert_eq!(
            presses(&reports),
            vec![key(0, &[0x04]), key(0, &[0x05]), key(0, &[0x06, 0x07])]
        );
    }

    #[test]
    fn release_delay_directive() {
        let mut enc = encoder(EncoderOptions::default());
        enc.encode("⏱20\r\nab".as_bytes()).unwrap();
        assert_eq!(enc.delays().release, Duration::from_millis(20));
        assert_eq!(presses(&enc.sink().reports()), vec![key(0, &[0x04, 0x05])]);
        assert_eq!(enc.pacer().pauses(), &[Duration::from_millis(20)]);
    }

    #[test]
    fn directive_ends_current_group() {
        let reports = encode("ab⏱0\ncd");
        assert_eq!(
            presses(&reports),
            vec![key(0, &[0x04, 0x05]), key(0, &[0x06, 0x07])]
        );
    }

    #[test]
    fn comment_is_skipped_through_newline() {
        let reports = encode("a⍝ ignored text\nb");
        assert_eq!(presses(&reports), vec![key(0, &[0x04]), key(0, &[0x05])]);

        let reports = encode("⍝ only a comment");
        assert!(reports.is_empty());
    }

    #[test]
    fn directives_alone_emit_nothing() {
        let mut enc = encoder(EncoderOptions::default());
        let summary = enc.encode("⌛10\n⏱10\n".as_bytes()).unwrap();
        assert_eq!(summary.reports, 0);
        assert!(enc.sink().is_empty());
        assert!(enc.pacer().pauses().is_empty());
    }

    #[test]
    fn unknown_character_is_skipped() {
        let mut enc = encoder(EncoderOptions::default());
        let summary = enc.encode("é".as_bytes()).unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.reports, 0);
        assert!(enc.sink().is_empty());
    }

    #[test]
    fn unknown_character_ends_group() {
        let reports = encode("aébc");
        assert_eq!(
            presses(&reports),
            vec![key(0, &[0x04]), key(0, &[0x05, 0x06])]
        );
    }

    #[test]
    fn unknown_character_can_be_fatal() {
        let mut enc = encoder(EncoderOptions {
            error_on_unknown: true,
            ..Default::default()
        });
        let err = enc.encode("ab€".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::UnknownCharacter { ch: '€', offset: 2 }
        ));
    }

    #[test]
    fn invalid_utf8_reports_offset_and_byte() {
        let mut enc = encoder(EncoderOptions::default());
        let err = enc.encode(b"ab\xFFc").unwrap_err();
        assert!(matches!(err, EncodeError::Decode { offset: 2, byte: 0xFF }));

        // Truncated sequence at the end of input
        let err = enc.encode(b"a\xE2\x8C").unwrap_err();
        assert!(matches!(err, EncodeError::Decode { offset: 1, byte: 0xE2 }));
    }

    #[test]
    fn decode_char_widths() {
        assert_eq!(decode_char(b"a", 0).unwrap(), ('a', 1));
        assert_eq!(decode_char("é".as_bytes(), 0).unwrap(), ('é', 2));
        assert_eq!(decode_char("⌛".as_bytes(), 0).unwrap(), ('⌛', 3));
        assert_eq!(decode_char("😀".as_bytes(), 0).unwrap(), ('😀', 4));
        // Overlong encoding and surrogate
        assert!(decode_char(b"\xC0\x80", 0).is_err());
        assert!(decode_char(b"\xED\xA0\x80", 0).is_err());
        // Continuation byte in lead position
        assert!(decode_char(b"\x80", 0).is_err());
    }

    #[test]
    fn summary_counts() {
        let mut enc = encoder(EncoderOptions::default());
        let summary = enc.encode("hello\n".as_bytes()).unwrap();
        assert_eq!(summary.bytes, 5);
        // "hel" | "lo\n" (second l repeats)
        assert_eq!(summary.reports, 2);
        assert_eq!(summary.shortcut_presses, 0);
    }

    #[test]
    fn no_keymaps_is_an_error() {
        let store = KeymapStore::new(StaticLoader::new());
        let result = Encoder::new(
            EncoderOptions {
                keymap_order: Vec::new(),
                ..Default::default()
            },
            store,
            MemorySink::new(),
            RecordingPacer::new(),
        );
        assert!(matches!(result, Err(EncodeError::NoKeymaps)));
    }

    #[test]
    fn reports_never_hold_duplicates() {
        let text = "The quick brown fox jumps over the lazy dog. AAAA bbbb 1122!!";
        for report in encode(text) {
            let bytes = report.to_bytes();
            assert_eq!(bytes[1], 0);
            let held: Vec<u8> = report.pressed().collect();
            let mut dedup = held.clone();
            dedup.sort_unstable();
            dedup.dedup();
            assert_eq!(held.len(), dedup.len(), "{report}");
        }
    }

    #[derive(Default)]
    struct SyncCounter {
        inner: MemorySink,
        syncs: usize,
    }

    impl ReportSink for SyncCounter {
        fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
            self.inner.write_bytes(bytes)
        }

        fn as_syncable(&mut self) -> Option<&mut dyn Syncable> {
            Some(self)
        }
    }

    impl Syncable for SyncCounter {
        fn sync(&mut self) -> Result<(), SinkError> {
            self.syncs += 1;
            Ok(())
        }
    }

    #[test]
    fn syncs_before_timed_waits() {
        let store = KeymapStore::new(StaticLoader::new().with("us", test_keymap()));
        let options = EncoderOptions {
            release_delay: Duration::from_millis(3),
            press_delay: Duration::from_millis(7),
            ..Default::default()
        };
        let mut enc =
            Encoder::new(options, store, SyncCounter::default(), RecordingPacer::new()).unwrap();
        enc.encode(b"ab").unwrap();
        // Two groups, each: sync+release wait, sync+press wait
        assert_eq!(enc.sink().syncs, 4);
        assert_eq!(
            enc.pacer().pauses(),
            &[
                Duration::from_millis(3),
                Duration::from_millis(7),
                Duration::from_millis(3),
                Duration::from_millis(7)
            ]
        );
    }

    /// Sink whose every write fails
    #[derive(Default)]
    struct BrokenSink {
        attempts: usize,
    }

    impl ReportSink for BrokenSink {
        fn write_bytes(&mut self, _bytes: &[u8]) -> Result<(), SinkError> {
            self.attempts += 1;
            Err(SinkError::Write(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "gadget gone",
            )))
        }
    }

    #[test]
    fn write_failure_ends_the_run_without_restoring() {
        let store = KeymapStore::new(StaticLoader::new().with("us", test_keymap()));
        let options = EncoderOptions {
            keymap_order: vec!["us".into(), "spare".into()],
            ..Default::default()
        };
        let mut enc =
            Encoder::new(options, store, BrokenSink::default(), RecordingPacer::new()).unwrap();
        let err = enc.encode(b"ab cd").unwrap_err();
        assert!(matches!(err, EncodeError::Sink(SinkError::Write(_))));
        // No release and no keymap restore after the failed press
        assert_eq!(enc.sink().attempts, 1);
    }

    // ── Streaming input ──

    #[test]
    fn reader_groups_stop_at_line_breaks() {
        let mut enc = encoder(EncoderOptions::default());
        let summary = enc.encode_reader(&b"ab\ncd"[..]).unwrap();
        assert_eq!(summary.bytes, 5);
        assert_eq!(
            presses(&enc.sink().reports()),
            vec![key(0, &[0x04, 0x05, 0x28]), key(0, &[0x06, 0x07])]
        );

        // The same text as one buffer shares a single report
        assert_eq!(
            presses(&encode("ab\ncd")),
            vec![key(0, &[0x04, 0x05, 0x28, 0x06, 0x07])]
        );
    }

    struct ClosedPipe;

    impl std::io::Read for ClosedPipe {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn reader_lines_are_typed_before_end_of_stream() {
        use std::io::{BufReader, Read};

        let mut enc = encoder(EncoderOptions::default());
        let input = BufReader::new(std::io::Cursor::new(b"hi\n".to_vec()).chain(ClosedPipe));
        let err = enc.encode_reader(input).unwrap_err();

        assert!(matches!(err, EncodeError::Input(_)));
        assert_eq!(
            presses(&enc.sink().reports()),
            vec![key(0, &[0x0B, 0x0C, 0x28])]
        );
    }

    #[test]
    fn reader_offsets_count_from_stream_start() {
        let mut enc = encoder(EncoderOptions {
            error_on_unknown: true,
            ..Default::default()
        });
        let err = enc.encode_reader(&b"ab\nc\xFF"[..]).unwrap_err();
        assert!(matches!(err, EncodeError::Decode { offset: 4, byte: 0xFF }));

        let err = enc.encode_reader("one\ntwo €".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::UnknownCharacter { ch: '€', offset: 8 }
        ));
    }
}
