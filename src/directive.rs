//! In-band directive arguments
//!
//! The delay markers are followed by a millisecond count and an optional line
//! ending: `⌛50\n`. The comment marker runs to the end of the line.

use std::time::Duration;

/// Parse the argument of a delay marker from the bytes following it.
///
/// Returns the number of bytes consumed and the delay. The digit run may be
/// followed by `\r`, `\n` or `\r\n`, which are consumed too. Without digits
/// nothing is consumed and the delay is zero. Values too large for a `u64`
/// saturate.
pub fn parse_delay(rest: &[u8]) -> (usize, Duration) {
    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return (0, Duration::ZERO);
    }
    let ms = rest[..digits].iter().fold(0u64, |acc, &d| {
        acc.saturating_mul(10).saturating_add(u64::from(d - b'0'))
    });

    let mut consumed = digits;
    if rest.get(consumed) == Some(&b'\r') {
        consumed += 1;
    }
    if rest.get(consumed) == Some(&b'\n') {
        consumed += 1;
    }
    (consumed, Duration::from_millis(ms))
}

/// Length of a comment body: everything up to and including the next `\n`,
/// or the rest of the input.
pub fn comment_len(rest: &[u8]) -> usize {
    rest.iter()
        .position(|&b| b == b'\n')
        .map_or(rest.len(), |newline| newline + 1)
}
