//! Match candidates and finalized entity spans.

use super::EntityType;
use crate::offset::Span;
use serde::{Deserialize, Serialize};

/// Index of an entry inside a [`crate::LexiconIndex`].
pub type EntryId = usize;

/// Index of a pattern inside the fixed pattern table.
pub type PatternId = usize;

/// Which pass proposed a span.
///
/// Precedence, highest first: `Pattern > ExactPhrase > Token > Fuzzy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Fixed shape pattern (vital signs, scores)
    Pattern,
    /// Multi-token lexicon term found verbatim
    ExactPhrase,
    /// Whole-token lexicon match
    Token,
    /// Approximate match above the similarity threshold
    Fuzzy,
}

impl MatchKind {
    /// Precedence rank; larger wins.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            MatchKind::Pattern => 3,
            MatchKind::ExactPhrase => 2,
            MatchKind::Token => 1,
            MatchKind::Fuzzy => 0,
        }
    }
}

/// Back-reference to what produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Lexicon entry
    Entry(EntryId),
    /// Pattern table row
    Pattern(PatternId),
}

/// Coordinate system of a candidate's offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coordinates {
    /// Char offsets into the sentence's normalized text
    Normalized,
    /// Char offsets into the original sentence text
    Original,
}

/// Unresolved proposal from one pass. Lives for one sentence call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Start (char offset, inclusive)
    pub start: usize,
    /// End (char offset, exclusive)
    pub end: usize,
    /// What `start`/`end` refer to
    pub coordinates: Coordinates,
    /// Entity type
    pub entity_type: EntityType,
    /// Score in [0, 1]
    pub score: f64,
    /// Producing pass
    pub kind: MatchKind,
    /// Sentence index within the document
    pub sentence_id: usize,
    /// Producing entry or pattern
    pub source: MatchSource,
    /// Entry priority (lower is preferred); 0 for patterns
    pub priority: i32,
}

impl MatchCandidate {
    /// Candidate range.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// Finalized annotation in original document char offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Start (document char offset, inclusive)
    pub start: usize,
    /// End (document char offset, exclusive)
    pub end: usize,
    /// Original text covered by the span
    pub surface_text: String,
    /// Entity type
    pub entity_type: EntityType,
    /// Score in [0, 1]
    pub score: f64,
    /// Pass that produced the surviving span
    pub kind: MatchKind,
    /// Original text of the enclosing sentence
    pub evidence_sentence: String,
    /// Sentence index within the document
    pub sentence_id: usize,
    /// Producing entry or pattern
    pub source: MatchSource,
    /// Entry priority (lower is preferred); 0 for patterns
    #[serde(default)]
    pub priority: i32,
}

impl EntitySpan {
    /// Span range.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Number of characters covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span covers nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}
