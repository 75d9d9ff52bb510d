//! Width accounting for ANSI-decorated text and the footer line layout.
//!
//! Escape sequences are zero-width: CSI (`ESC [ params final`), OSC
//! (`ESC ] ... BEL` or `ESC ] ... ESC \`) and two-byte `ESC x` escapes are
//! recognized. Everything else is measured with `unicode-width`.

use unicode_width::UnicodeWidthChar;

use crate::style::{RESET, ellipsis};

/// Upper bound on the bar relative to the whole line.
const MAX_BAR_FRACTION_NUM: usize = 1;
const MAX_BAR_FRACTION_DEN: usize = 2;

/// Piece of a decorated string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Escape(&'a str),
    Text(char),
}

/// Iterator splitting a string into escapes and visible characters.
pub struct Segments<'a> {
    src: &'a str,
    pos: usize,
}

pub fn segments(src: &str) -> Segments<'_> {
    Segments { src, pos: 0 }
}

impl<'a> Segments<'a> {
    /// Byte length of the escape sequence starting at `start` (which holds ESC).
    fn escape_len(&self, start: usize) -> usize {
        let bytes = self.src.as_bytes();
        let mut i = start + 1;
        match bytes.get(i) {
            None => 1,
            Some(b'[') => {
                i += 1;
                while let Some(&b) = bytes.get(i) {
                    i += 1;
                    if (0x40..=0x7e).contains(&b) {
                        return i - start;
                    }
                    if !(0x20..=0x3f).contains(&b) {
                        // Malformed CSI: stop before the offending byte.
                        return i - 1 - start;
                    }
                }
                i - start
            }
            Some(b']') => {
                i += 1;
                while let Some(&b) = bytes.get(i) {
                    if b == 0x07 {
                        return i + 1 - start;
                    }
                    if b == 0x1b && bytes.get(i + 1) == Some(&b'\\') {
                        return i + 2 - start;
                    }
                    i += 1;
                }
                i - start
            }
            Some(_) => {
                // ESC followed by one (possibly multi-byte) character.
                let next = self.src[i..].chars().next().map_or(0, char::len_utf8);
                1 + next
            }
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.src.get(self.pos..)?;
        let c = rest.chars().next()?;
        if c == '\x1b' {
            let len = self.escape_len(self.pos);
            let seq = &self.src[self.pos..self.pos + len];
            self.pos += len;
            return Some(Segment::Escape(seq));
        }
        self.pos += c.len_utf8();
        Some(Segment::Text(c))
    }
}

fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

/// Terminal columns occupied by `text`, ignoring escape sequences.
pub fn visible_width(text: &str) -> usize {
    segments(text)
        .map(|seg| match seg {
            Segment::Escape(_) => 0,
            Segment::Text(c) => char_width(c),
        })
        .sum()
}

/// Cut `text` to at most `width` columns, appending `marker` when anything was dropped.
///
/// Escapes before the cut are kept verbatim and a reset is emitted before the
/// marker so colors never bleed past the line.
pub fn truncate_to_width(text: &str, width: usize, marker: &str) -> String {
    if visible_width(text) <= width {
        return text.to_string();
    }

    let marker_width = visible_width(marker);
    let (budget, marker) = if marker_width <= width {
        (width - marker_width, marker)
    } else {
        (width, "")
    };

    let mut out = String::with_capacity(text.len() + marker.len() + RESET.len());
    let mut used = 0;
    for seg in segments(text) {
        match seg {
            Segment::Escape(seq) => out.push_str(seq),
            Segment::Text(c) => {
                let w = char_width(c);
                if used + w > budget {
                    break;
                }
                used += w;
                out.push(c);
            }
        }
    }
    out.push_str(RESET);
    out.push_str(marker);
    out
}

/// Truncate with the standard dimmed ellipsis.
pub fn fit_to_width(text: &str, width: usize) -> String {
    truncate_to_width(text, width, &ellipsis())
}

/// Preferred bar length before any width constraint.
pub fn desired_bar_cells(width: usize) -> usize {
    if width >= 100 {
        40
    } else if width >= 80 {
        30
    } else {
        20
    }
}

/// Smallest bar worth drawing at this terminal width.
pub fn min_bar_cells(width: usize) -> usize {
    if width >= 120 {
        12
    } else if width >= 80 {
        8
    } else if width >= 40 {
        5
    } else {
        3
    }
}

/// Cells available to the bar between `left` and `right` segments of the given widths.
///
/// Returns 0 when the space left over is below the width-tiered minimum.
pub fn bar_cells(width: usize, left_width: usize, right_width: usize) -> usize {
    // One space on each side of the bar.
    const SEPARATOR_COST: usize = 2;

    let fraction_cap = width * MAX_BAR_FRACTION_NUM / MAX_BAR_FRACTION_DEN;
    let available = width
        .saturating_sub(left_width)
        .saturating_sub(right_width)
        .saturating_sub(SEPARATOR_COST);
    let cells = desired_bar_cells(width).min(fraction_cap).min(available);
    if cells < min_bar_cells(width) { 0 } else { cells }
}

/// Join the non-empty parts with single spaces.
pub fn join_segments(parts: &[&str]) -> String {
    let mut line = String::new();
    for part in parts.iter().filter(|p| !p.is_empty()) {
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(part);
    }
    line
}
