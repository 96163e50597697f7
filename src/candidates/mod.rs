//! Candidate generation: four independent passes over one sentence.
//!
//! ```text
//!                 ┌────────────┐   original sentence text
//!   1. pattern    │ shape regex│──────────────────────────────▶ Original coords
//!                 └────────────┘
//!                 ┌────────────┐
//!   2. phrase     │ multi-token│─┐
//!                 │ substrings │ │
//!                 └────────────┘ │ normalized sentence text
//!                 ┌────────────┐ ├────────────────────────────▶ Normalized coords
//!   3. token      │ whole-token│─┤
//!                 │  equality  │ │
//!                 └────────────┘ │
//!                 ┌────────────┐ │  sees coverage and matched entries
//!   4. fuzzy      │  blocked   │─┘  from passes 1-3
//!                 │  windows   │
//!                 └────────────┘
//! ```
//!
//! Passes run in fixed order; candidates are returned in pass order, then
//! in discovery order. Generation never fails.

mod fuzzy;
pub mod patterns;

use crate::config::{ExtractorConfig, FuzzyConfig, PassSet};
use crate::lexicon::{LexiconEntry, LexiconIndex};
use crate::normalize::{Normalized, Token};
use crate::offset::{CharIndex, Span};
use crate::types::{Coordinates, EntryId, MatchCandidate, MatchKind, MatchSource};
use log::debug;
use std::collections::{BTreeSet, HashSet};

/// Score of pattern candidates.
pub const PATTERN_SCORE: f64 = 0.95;
/// Score of exact-phrase candidates.
pub const EXACT_PHRASE_SCORE: f64 = 0.99;
/// Score of token-coverage candidates.
pub const TOKEN_SCORE: f64 = 0.95;

/// One sentence as seen by the generator.
#[derive(Debug, Clone, Copy)]
pub struct SentenceInput<'a> {
    /// Sentence index within the document
    pub id: usize,
    /// Original sentence text
    pub text: &'a str,
    /// Normalized form of `text`
    pub normalized: &'a Normalized,
}

/// Produces typed candidates from the enabled passes.
#[derive(Debug, Clone, Default)]
pub struct CandidateGenerator {
    passes: PassSet,
    fuzzy: FuzzyConfig,
}

impl CandidateGenerator {
    /// Create a generator.
    #[must_use]
    pub fn new(passes: PassSet, fuzzy: FuzzyConfig) -> Self {
        Self { passes, fuzzy }
    }

    /// Create a generator from an extractor configuration.
    #[must_use]
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.passes, config.fuzzy.clone())
    }

    /// Run every enabled pass over `sentence`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use clinspan::candidates::{CandidateGenerator, SentenceInput};
    /// use clinspan::{EntityType, LexiconIndex, LexiconRecord, MatchKind, Normalizer};
    ///
    /// let index = LexiconIndex::build(vec![LexiconRecord::new("febre", EntityType::Symptom, 1)]);
    /// let text = "Refere febre alta";
    /// let normalized = Normalizer::new().normalize(text);
    /// let sentence = SentenceInput { id: 0, text, normalized: &normalized };
    ///
    /// let found = CandidateGenerator::default().find_candidates(&sentence, &index);
    /// assert_eq!(found.len(), 1);
    /// assert_eq!(found[0].kind, MatchKind::Token);
    /// assert_eq!((found[0].start, found[0].end), (7, 12));
    /// ```
    #[must_use]
    pub fn find_candidates(
        &self,
        sentence: &SentenceInput<'_>,
        index: &LexiconIndex,
    ) -> Vec<MatchCandidate> {
        let normalized = sentence.normalized;
        let tokens = normalized.tokens();
        let chars = CharIndex::new(&normalized.text);
        let mut covered = vec![false; normalized.char_len()];
        let mut matched: HashSet<EntryId> = HashSet::new();
        let mut out = Vec::new();

        if self.passes.pattern {
            let found = pattern_pass(sentence);
            mark_original_coverage(normalized, &found, &mut covered);
            debug!("sentence {}: pattern pass found {}", sentence.id, found.len());
            out.extend(found);
        }

        if self.passes.exact_phrase {
            let found = exact_phrase_pass(sentence, &tokens, index, &chars);
            mark_coverage(&found, &mut covered, &mut matched);
            debug!("sentence {}: exact-phrase pass found {}", sentence.id, found.len());
            out.extend(found);
        }

        if self.passes.token {
            let found = token_pass(sentence, &tokens, index, &chars, &matched);
            mark_coverage(&found, &mut covered, &mut matched);
            debug!("sentence {}: token pass found {}", sentence.id, found.len());
            out.extend(found);
        }

        if self.passes.fuzzy {
            let found =
                fuzzy::fuzzy_candidates(sentence, &tokens, index, &self.fuzzy, &covered, &matched);
            debug!("sentence {}: fuzzy pass found {}", sentence.id, found.len());
            out.extend(found);
        }

        out
    }
}

// =============================================================================
// Passes
// =============================================================================

fn pattern_pass(sentence: &SentenceInput<'_>) -> Vec<MatchCandidate> {
    let table = patterns::patterns();
    patterns::find_pattern_spans(sentence.text)
        .into_iter()
        .map(|(id, span)| MatchCandidate {
            start: span.start,
            end: span.end,
            coordinates: Coordinates::Original,
            entity_type: table[id].entity_type,
            score: PATTERN_SCORE,
            kind: MatchKind::Pattern,
            sentence_id: sentence.id,
            source: MatchSource::Pattern(id),
            priority: 0,
        })
        .collect()
}

fn exact_phrase_pass(
    sentence: &SentenceInput<'_>,
    tokens: &[Token<'_>],
    index: &LexiconIndex,
    chars: &CharIndex,
) -> Vec<MatchCandidate> {
    let text = &sentence.normalized.text;
    let mut out = Vec::new();
    for entry in phrase_entries(tokens, index) {
        for (byte, term) in text.match_indices(entry.normalized_term.as_str()) {
            let span = chars.span_from_bytes(byte, byte + term.len());
            out.push(lexicon_candidate(
                sentence,
                span,
                entry,
                MatchKind::ExactPhrase,
                EXACT_PHRASE_SCORE,
            ));
        }
    }
    out
}

/// Multi-token entries that can occur in the sentence, in id order.
///
/// An occurrence of `a b ...` ends its first token right before a space,
/// so `a` is a suffix of some sentence token.
fn phrase_entries<'i>(tokens: &[Token<'_>], index: &'i LexiconIndex) -> Vec<&'i LexiconEntry> {
    let mut ids: BTreeSet<EntryId> = BTreeSet::new();
    for token in tokens {
        for (byte, _) in token.text.char_indices() {
            ids.extend(
                index
                    .multi_token_entries_starting_with(&token.text[byte..])
                    .iter()
                    .copied(),
            );
        }
    }
    ids.into_iter().filter_map(|id| index.entry(id)).collect()
}

fn token_pass(
    sentence: &SentenceInput<'_>,
    tokens: &[Token<'_>],
    index: &LexiconIndex,
    chars: &CharIndex,
    already_matched: &HashSet<EntryId>,
) -> Vec<MatchCandidate> {
    let mut out = Vec::new();

    for token in tokens {
        if let Some(entry) = index.single_token_entry(token.text) {
            out.push(lexicon_candidate(
                sentence,
                token.span(),
                entry,
                MatchKind::Token,
                TOKEN_SCORE,
            ));
        }
    }

    // Multi-token entries the phrase pass did not capture
    let present: HashSet<&str> = tokens.iter().map(|t| t.text).collect();
    let mut multi: BTreeSet<EntryId> = BTreeSet::new();
    for token in tokens {
        multi.extend(index.multi_token_entries_with(token.text).iter().copied());
    }
    let text = &sentence.normalized.text;
    for id in multi {
        if already_matched.contains(&id) {
            continue;
        }
        let Some(entry) = index.entry(id) else {
            continue;
        };
        if !entry.tokens.iter().all(|t| present.contains(t.as_str())) {
            continue;
        }
        for (byte, term) in text.match_indices(entry.normalized_term.as_str()) {
            let span = chars.span_from_bytes(byte, byte + term.len());
            out.push(lexicon_candidate(
                sentence,
                span,
                entry,
                MatchKind::Token,
                TOKEN_SCORE,
            ));
        }
    }
    out
}

fn lexicon_candidate(
    sentence: &SentenceInput<'_>,
    span: Span,
    entry: &LexiconEntry,
    kind: MatchKind,
    score: f64,
) -> MatchCandidate {
    MatchCandidate {
        start: span.start,
        end: span.end,
        coordinates: Coordinates::Normalized,
        entity_type: entry.entity_type,
        score,
        kind,
        sentence_id: sentence.id,
        source: MatchSource::Entry(entry.id),
        priority: entry.priority,
    }
}

// =============================================================================
// Coverage
// =============================================================================

fn mark_coverage(found: &[MatchCandidate], covered: &mut [bool], matched: &mut HashSet<EntryId>) {
    for c in found {
        let end = c.end.min(covered.len());
        for flag in covered.iter_mut().take(end).skip(c.start) {
            *flag = true;
        }
        if let MatchSource::Entry(id) = c.source {
            matched.insert(id);
        }
    }
}

/// Pattern spans are in original coordinates: a normalized char is covered
/// when its whole origin lies inside a pattern span.
fn mark_original_coverage(normalized: &Normalized, found: &[MatchCandidate], covered: &mut [bool]) {
    for (i, origin) in normalized.alignment.iter().enumerate() {
        if found
            .iter()
            .any(|c| origin.start >= c.start && origin.end <= c.end)
        {
            covered[i] = true;
        }
    }
}
