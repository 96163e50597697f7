//! Text normalization with an alignment back to the original text.
//!
//! Matching happens on a canonical form of the text; reported spans must
//! point into the original. Every normalized character therefore remembers
//! the original character range it came from.
//!
//! # Pipeline (order is fixed)
//!
//! ```text
//! "Dor  Epigástrica, intensa."
//!   │ lowercase
//!   │ diacritic fold (NFD, drop combining marks)
//!   │ whitespace collapse
//!   │ strip punctuation except '-' and '_'
//!   │ trim
//!   ▼
//! "dor epigastrica intensa"
//!
//! normalized:  d   o   r   ␠      e   p  ...
//! alignment:  0..1 1..2 2..3 3..5 5..6 6..7 ...
//! ```
//!
//! Whitespace separated only by stripped punctuation collapses into the same
//! single space (`"dor , febre"` → `"dor febre"`), so normalizing twice gives
//! the same result as normalizing once.

use crate::offset::Span;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use unicode_normalization::char::{decompose_canonical, is_combining_mark};

/// Normalized text plus its alignment to the original.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Normalized {
    /// Canonical text used for matching
    pub text: String,
    /// `alignment[i]` is the original char range that produced normalized char `i`
    pub alignment: Vec<Range<usize>>,
}

/// A whitespace-delimited token of normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token text
    pub text: &'a str,
    /// Char offset in the normalized text (inclusive)
    pub start: usize,
    /// Char offset in the normalized text (exclusive)
    pub end: usize,
}

impl Token<'_> {
    /// Token range in normalized chars.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

impl Normalized {
    /// Number of normalized characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.alignment.len()
    }

    /// Check if normalization produced nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Tokens split on the single separating space, with char offsets.
    #[must_use]
    pub fn tokens(&self) -> Vec<Token<'_>> {
        let mut tokens = Vec::new();
        let mut char_pos = 0;
        for piece in self.text.split(' ') {
            let len = piece.chars().count();
            if len > 0 {
                tokens.push(Token {
                    text: piece,
                    start: char_pos,
                    end: char_pos + len,
                });
            }
            char_pos += len + 1;
        }
        tokens
    }
}

/// Canonicalizes text for matching. Stateless, pure and total.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    /// Create a normalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Normalize `text`, keeping the alignment to original char offsets.
    ///
    /// # Example
    ///
    /// ```rust
    /// use clinspan::Normalizer;
    ///
    /// let n = Normalizer::new().normalize("Dor  Epigástrica!");
    /// assert_eq!(n.text, "dor epigastrica");
    /// assert_eq!(n.alignment[3], 3..5);
    /// ```
    #[must_use]
    pub fn normalize(&self, text: &str) -> Normalized {
        let mut out = String::with_capacity(text.len());
        let mut alignment: Vec<Range<usize>> = Vec::with_capacity(text.len());
        let mut pending_space: Option<Range<usize>> = None;
        let mut folded: Vec<char> = Vec::with_capacity(4);

        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                pending_space = Some(match pending_space {
                    Some(run) => run.start..i + 1,
                    None => i..i + 1,
                });
                continue;
            }

            folded.clear();
            for lower in c.to_lowercase() {
                decompose_canonical(lower, |d| {
                    if !is_combining_mark(d) && is_kept(d) {
                        folded.push(d);
                    }
                });
            }

            if folded.is_empty() {
                // A decomposed accent stays attached to its base letter
                if is_combining_mark(c) && pending_space.is_none() {
                    if let Some(last) = alignment.last_mut() {
                        if last.end == i {
                            last.end = i + 1;
                        }
                    }
                }
                continue;
            }

            if let Some(run) = pending_space.take() {
                if !alignment.is_empty() {
                    out.push(' ');
                    alignment.push(run);
                }
            }
            for &d in &folded {
                out.push(d);
                alignment.push(i..i + 1);
            }
        }

        Normalized {
            text: out,
            alignment,
        }
    }

    /// Normalize without keeping the alignment.
    #[must_use]
    pub fn normalize_str(&self, text: &str) -> String {
        self.normalize(text).text
    }
}

fn is_kept(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}
