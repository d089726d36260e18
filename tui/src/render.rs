//! Terminal string utilities -- ANSI formatting, padding, box drawing.
//!
//! All functions produce `String` output. Nothing is written to stdout
//! directly. [`crate::text`] composes these into the one-shot card grid.

// ---------------------------------------------------------------------------
// ANSI escape constants
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

// ---------------------------------------------------------------------------
// Box-drawing characters
// ---------------------------------------------------------------------------

pub const BOX_H: char = '\u{2500}';  // ─
pub const BOX_V: char = '\u{2502}';  // │
pub const BOX_TL: char = '\u{256D}'; // ╭
pub const BOX_TR: char = '\u{256E}'; // ╮
pub const BOX_BL: char = '\u{2570}'; // ╰
pub const BOX_BR: char = '\u{256F}'; // ╯

// ---------------------------------------------------------------------------
// String helpers
// ---------------------------------------------------------------------------

/// Truncate a string to `max_width` characters, appending an ellipsis if truncated.
/// If `max_width` < 3 the string is simply cut.
pub fn truncate(s: &str, max_width: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_width {
        return s.to_string();
    }
    if max_width < 3 {
        return chars[..max_width].iter().collect();
    }
    let mut result: String = chars[..max_width - 1].iter().collect();
    result.push('\u{2026}'); // ellipsis character
    result
}

/// Pad a string on the right to exactly `width` visible characters.
/// If the string is longer, it is truncated. ANSI escapes do not count
/// towards the width.
pub fn pad_right(s: &str, width: usize) -> String {
    let visible = visible_width(s);
    if visible > width {
        return truncate(&strip_ansi(s), width);
    }
    let mut result = s.to_string();
    result.push_str(&" ".repeat(width - visible));
    result
}

/// Place `left` and `right` on one line of exactly `width` visible
/// characters, truncating `left` first when they do not fit.
pub fn split_line(left: &str, right: &str, width: usize) -> String {
    let right_width = visible_width(right);
    if right_width + 1 >= width {
        return pad_right(left, width);
    }
    let left_width = width - right_width - 1;
    format!("{} {}", pad_right(left, left_width), right)
}

/// Strip ANSI escape sequences from a string for width calculation.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::new();
    let mut in_escape = false;
    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
            continue;
        }
        if ch == '\x1b' {
            in_escape = true;
            continue;
        }
        result.push(ch);
    }
    result
}

/// Visible width of a string (ignoring ANSI escape codes).
pub fn visible_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/// Wrap `s` in `style` ... `RESET` when `enabled`, otherwise return it as is.
pub fn paint(s: &str, style: &str, enabled: bool) -> String {
    if enabled {
        format!("{}{}{}", style, s, RESET)
    } else {
        s.to_string()
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
