//! Character offsets, spans, and span geometry.
//!
//! # Coordinate System
//!
//! Every offset that crosses the public API is a **character offset**
//! (Unicode scalar values), half-open `[start, end)`. Reference annotations
//! count characters, not bytes, and clinical Portuguese is full of multi-byte
//! letters:
//!
//! ```text
//! Text:   "dor epigástrica"
//!
//! CHAR:    d o r _ e p i g á s t r i c a
//!          0 1 2 3 4 5 6 7 8 9 ...      14   (15 chars)
//!
//! BYTE:    d o r _ e p i g [á ] s ...          (16 bytes)
//!          0 1 2 3 4 5 6 7 8-9 10 ...
//! ```
//!
//! `regex` and `str::match_indices` report bytes, so every byte offset is
//! converted with a [`CharIndex`] right where it is produced.
//!
//! # Span Geometry
//!
//! ```text
//! a:        [=========)            overlap(a, b)     = 4
//! b:              [=========)      iou(a, b)         = 4 / (10 + 10 - 4)
//!           0     6   10    16     min_coverage(a,b) = 4 / min(10, 10)
//! ```
//!
//! The same measures serve overlap resolution (`min_coverage`, called the
//! overlap ratio there) and evaluation (`iou`, `min_coverage`, `contains`).

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A half-open character range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Character offset (start, inclusive)
    pub start: usize,
    /// Character offset (end, exclusive)
    pub end: usize,
}

impl Span {
    /// Create a span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of characters covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span covers nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Character range.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Shift both ends by `offset`.
    #[must_use]
    pub const fn shifted(&self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    /// Length of the intersection: `max(0, min(a.end, b.end) - max(a.start, b.start))`.
    #[must_use]
    pub fn overlap(&self, other: &Span) -> usize {
        self.end
            .min(other.end)
            .saturating_sub(self.start.max(other.start))
    }

    /// True if the spans share at least one character.
    #[must_use]
    pub fn overlaps(&self, other: &Span) -> bool {
        self.overlap(other) > 0
    }

    /// Intersection over union. Two empty spans have IoU 0.
    #[must_use]
    pub fn iou(&self, other: &Span) -> f64 {
        let overlap = self.overlap(other);
        let union = self.len() + other.len() - overlap;
        if union == 0 {
            0.0
        } else {
            overlap as f64 / union as f64
        }
    }

    /// Intersection over the shorter span's length.
    ///
    /// This is the "overlap ratio" used during overlap resolution and the
    /// `min_cov` measure used by evaluation.
    #[must_use]
    pub fn min_coverage(&self, other: &Span) -> f64 {
        let min_len = self.len().min(other.len());
        if min_len == 0 {
            0.0
        } else {
            self.overlap(other) as f64 / min_len as f64
        }
    }

    /// True if either span encloses the other and they share at least one character.
    #[must_use]
    pub fn contains_or_within(&self, other: &Span) -> bool {
        if !self.overlaps(other) {
            return false;
        }
        (self.start >= other.start && self.end <= other.end)
            || (other.start >= self.start && other.end <= self.end)
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// =============================================================================
// Byte <-> Char Conversion
// =============================================================================

/// Pre-computed byte/char tables for one text.
///
/// Each conversion is O(1) (O(log n) for bytes inside a character). ASCII
/// text skips the tables entirely.
#[derive(Debug, Clone)]
pub struct CharIndex {
    /// Byte offset of every char, plus the total byte length at the end.
    char_to_byte: Vec<usize>,
    is_ascii: bool,
    byte_len: usize,
}

impl CharIndex {
    /// Build the index for `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self {
                char_to_byte: Vec::new(),
                is_ascii: true,
                byte_len: text.len(),
            };
        }
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            is_ascii: false,
            byte_len: text.len(),
        }
    }

    /// Number of characters in the text.
    #[must_use]
    pub fn char_len(&self) -> usize {
        if self.is_ascii {
            self.byte_len
        } else {
            self.char_to_byte.len() - 1
        }
    }

    /// Convert a byte offset to the index of the character containing it.
    ///
    /// Offsets past the end clamp to the char length.
    #[must_use]
    pub fn byte_to_char(&self, byte_idx: usize) -> usize {
        if self.is_ascii {
            return byte_idx.min(self.byte_len);
        }
        match self.char_to_byte.binary_search(&byte_idx) {
            Ok(char_idx) => char_idx,
            // Inside a multi-byte char: the char starting before it
            Err(insert) => insert.saturating_sub(1).min(self.char_len()),
        }
    }

    /// Convert a char offset to a byte offset. Offsets past the end clamp.
    #[must_use]
    pub fn char_to_byte(&self, char_idx: usize) -> usize {
        if self.is_ascii {
            char_idx.min(self.byte_len)
        } else {
            self.char_to_byte
                .get(char_idx)
                .copied()
                .unwrap_or(self.byte_len)
        }
    }

    /// Convert a byte range to a char span.
    #[must_use]
    pub fn span_from_bytes(&self, byte_start: usize, byte_end: usize) -> Span {
        Span::new(self.byte_to_char(byte_start), self.byte_to_char(byte_end))
    }

    /// Slice `text` (the text this index was built from) by char offsets.
    #[must_use]
    pub fn slice<'a>(&self, text: &'a str, span: Span) -> &'a str {
        let start = self.char_to_byte(span.start);
        let end = self.char_to_byte(span.end);
        text.get(start..end).unwrap_or("")
    }
}

/// Slice `text` by char offsets without a pre-built index.
///
/// Out-of-range offsets clamp; an inverted range yields `""`.
#[must_use]
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let mut indices = text.char_indices().map(|(b, _)| b);
    let byte_start = indices.nth(start).unwrap_or(text.len());
    // `nth` consumed start + 1 positions
    let byte_end = indices.nth(end - start - 1).unwrap_or(text.len());
    text.get(byte_start..byte_end).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_partial_overlap() {
        let a = Span::new(0, 10);
        let b = Span::new(6, 16);
        assert_eq!(a.overlap(&b), 4);
        assert!((a.iou(&b) - 4.0 / 16.0).abs() < 1e-9);
        assert!((a.min_coverage(&b) - 0.4).abs() < 1e-9);
        assert!(!a.contains_or_within(&b));
    }

    #[test]
    fn test_geometry_disjoint_and_adjacent() {
        let a = Span::new(0, 5);
        let b = Span::new(5, 9);
        assert_eq!(a.overlap(&b), 0);
        assert!(!a.overlaps(&b));
        assert_eq!(a.iou(&b), 0.0);
        assert_eq!(a.min_coverage(&b), 0.0);
        assert!(!a.contains_or_within(&b));
    }

    #[test]
    fn test_geometry_containment() {
        let gold = Span::new(20, 36);
        let pred = Span::new(20, 28);
        assert_eq!(gold.overlap(&pred), 8);
        assert!((gold.iou(&pred) - 0.5).abs() < 1e-9);
        assert!((gold.min_coverage(&pred) - 1.0).abs() < 1e-9);
        assert!(gold.contains_or_within(&pred));
        assert!(pred.contains_or_within(&gold));
    }

    #[test]
    fn test_char_index_unicode() {
        let text = "dor epigástrica";
        let idx = CharIndex::new(text);
        assert_eq!(idx.char_len(), 15);
        // "á" is char 8, bytes 8..10
        assert_eq!(idx.char_to_byte(8), 8);
        assert_eq!(idx.char_to_byte(9), 10);
        assert_eq!(idx.byte_to_char(10), 9);
        // byte 9 sits inside "á"
        assert_eq!(idx.byte_to_char(9), 8);
        assert_eq!(idx.byte_to_char(text.len()), 15);
        assert_eq!(idx.slice(text, Span::new(4, 15)), "epigástrica");
    }

    #[test]
    fn test_char_index_ascii_fast_path() {
        let text = "febre alta";
        let idx = CharIndex::new(text);
        assert_eq!(idx.char_len(), 10);
        assert_eq!(idx.byte_to_char(6), 6);
        assert_eq!(idx.slice(text, Span::new(6, 10)), "alta");
        assert_eq!(idx.char_to_byte(99), 10);
    }

    #[test]
    fn test_char_slice() {
        assert_eq!(char_slice("náusea e vômito", 9, 15), "vômito");
        assert_eq!(char_slice("abc", 2, 1), "");
        assert_eq!(char_slice("abc", 1, 10), "bc");
    }
}
