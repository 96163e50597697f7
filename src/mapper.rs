//! Normalized offsets back to original document offsets.
//!
//! ```text
//! original:    "Dor  Epigástrica"      sentence starts at doc char 40
//! normalized:  "dor epigastrica"
//! candidate:   [4, 15) normalized
//!   alignment[4]  = 5..6     first original char
//!   alignment[14] = 15..16   last original char
//!   → [5, 16) sentence-local → [45, 56) document
//! ```
//!
//! A boundary that does not map to exactly one original position fails
//! closed: the candidate is dropped and reported instead of being widened or
//! shrunk.

use crate::normalize::Normalized;
use crate::offset::Span;
use crate::types::{Coordinates, MatchCandidate};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a candidate could not be mapped.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapError {
    /// `start >= end`
    #[error("empty range [{start}, {end})")]
    EmptyRange {
        /// Candidate start
        start: usize,
        /// Candidate end
        end: usize,
    },
    /// Range runs past the text it refers to
    #[error("range end {end} exceeds length {len}")]
    OutOfBounds {
        /// Candidate end
        end: usize,
        /// Length of the referenced text in chars
        len: usize,
    },
    /// Boundary splits the characters produced by one original character
    #[error("boundary {boundary} splits a case expansion")]
    SplitExpansion {
        /// Normalized boundary offset
        boundary: usize,
    },
    /// Boundary character is a collapsed whitespace run
    #[error("boundary {boundary} is a collapsed whitespace run")]
    CollapsedWhitespace {
        /// Normalized boundary offset
        boundary: usize,
    },
}

/// A candidate dropped during mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedCandidate {
    /// The candidate as generated
    pub candidate: MatchCandidate,
    /// Why it was dropped
    pub reason: MapError,
}

/// Maps candidates of one sentence to document char offsets.
#[derive(Debug, Clone)]
pub struct SpanMapper<'a> {
    normalized: &'a Normalized,
    normalized_chars: Vec<char>,
    sentence_start: usize,
    sentence_len: usize,
}

impl<'a> SpanMapper<'a> {
    /// Create a mapper for a sentence of `sentence_len` chars starting at
    /// document offset `sentence_start`.
    #[must_use]
    pub fn new(normalized: &'a Normalized, sentence_start: usize, sentence_len: usize) -> Self {
        Self {
            normalized,
            normalized_chars: normalized.text.chars().collect(),
            sentence_start,
            sentence_len,
        }
    }

    /// Map one candidate to document offsets.
    pub fn map(&self, candidate: &MatchCandidate) -> Result<Span, MapError> {
        let (start, end) = (candidate.start, candidate.end);
        if start >= end {
            return Err(MapError::EmptyRange { start, end });
        }

        let local = match candidate.coordinates {
            Coordinates::Original => {
                if end > self.sentence_len {
                    return Err(MapError::OutOfBounds {
                        end,
                        len: self.sentence_len,
                    });
                }
                Span::new(start, end)
            }
            Coordinates::Normalized => self.map_normalized(start, end)?,
        };
        Ok(local.shifted(self.sentence_start))
    }

    fn map_normalized(&self, start: usize, end: usize) -> Result<Span, MapError> {
        let alignment = &self.normalized.alignment;
        if end > alignment.len() {
            return Err(MapError::OutOfBounds {
                end,
                len: alignment.len(),
            });
        }

        if start > 0 && alignment[start - 1] == alignment[start] {
            return Err(MapError::SplitExpansion { boundary: start });
        }
        if end < alignment.len() && alignment[end] == alignment[end - 1] {
            return Err(MapError::SplitExpansion { boundary: end });
        }

        for boundary in [start, end - 1] {
            if self.normalized_chars[boundary] == ' ' && alignment[boundary].len() > 1 {
                return Err(MapError::CollapsedWhitespace { boundary });
            }
        }

        let first = alignment[start].start;
        let last = alignment[end - 1].end;
        if last > self.sentence_len {
            return Err(MapError::OutOfBounds {
                end: last,
                len: self.sentence_len,
            });
        }
        Ok(Span::new(first, last))
    }

    /// Map a batch, splitting it into mapped pairs and dropped diagnostics.
    pub fn map_all(
        &self,
        candidates: Vec<MatchCandidate>,
    ) -> (Vec<(MatchCandidate, Span)>, Vec<DroppedCandidate>) {
        let mut mapped = Vec::with_capacity(candidates.len());
        let mut dropped = Vec::new();
        for candidate in candidates {
            match self.map(&candidate) {
                Ok(span) => mapped.push((candidate, span)),
                Err(reason) => {
                    debug!(
                        "sentence {}: dropping {:?} candidate [{}, {}): {}",
                        candidate.sentence_id, candidate.kind, candidate.start, candidate.end, reason
                    );
                    dropped.push(DroppedCandidate { candidate, reason });
                }
            }
        }
        (mapped, dropped)
    }
}
