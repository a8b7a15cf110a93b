//! Text helpers for log previews.

use std::borrow::Cow;

/// Longest prefix of `s` that fits in `max_bytes` and ends on a char boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Single-line preview of `s` for log messages.
///
/// Line breaks become spaces and text longer than `max_bytes` is cut and
/// suffixed with `...`.
pub fn preview(s: &str, max_bytes: usize) -> Cow<'_, str> {
    let cut = truncate_str(s, max_bytes);
    let truncated = cut.len() < s.len();

    if !truncated && !cut.contains(['\n', '\r']) {
        return Cow::Borrowed(s);
    }

    let mut line = cut.replace(['\n', '\r'], " ");
    if truncated {
        line.push_str("...");
    }
    Cow::Owned(line)
}
