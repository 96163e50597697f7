//! Extraction pipeline.
//!
//! ```text
//! Sentence ──▶ Normalizer ──▶ CandidateGenerator ──▶ SpanMapper ──▶ [EntityFilter] ──▶ OverlapResolver
//!                                  ▲                     │
//!                           &LexiconIndex          DroppedCandidate
//!                                                  (diagnostics)
//! ```
//!
//! Sentences are processed independently; a document's output is the
//! concatenation of its sentences' output in document order.

use crate::candidates::{CandidateGenerator, SentenceInput};
use crate::config::ExtractorConfig;
use crate::lexicon::LexiconIndex;
use crate::mapper::{DroppedCandidate, SpanMapper};
use crate::normalize::Normalizer;
use crate::offset::{char_slice, CharIndex, Span};
use crate::postprocess::EntityFilter;
use crate::resolve::OverlapResolver;
use crate::types::EntitySpan;
use crate::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// A sentence of a document, in original document char offsets.
///
/// Supplied by an upstream segmenter and trusted as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Original sentence text
    pub text: String,
    /// Document char offset of the first char
    pub start: usize,
    /// Document char offset past the last char
    pub end: usize,
}

impl Sentence {
    /// Create a sentence starting at document offset `start`.
    #[must_use]
    pub fn new(text: impl Into<String>, start: usize) -> Self {
        let text = text.into();
        let end = start + text.chars().count();
        Self { text, start, end }
    }

    /// Cut a sentence out of `document` by char offsets.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] for an empty or out-of-range span.
    pub fn from_document(document: &str, start: usize, end: usize) -> Result<Self> {
        let chars = CharIndex::new(document);
        if start >= end {
            return Err(Error::invalid_input(format!(
                "empty sentence span [{start}, {end})"
            )));
        }
        if end > chars.char_len() {
            return Err(Error::invalid_input(format!(
                "sentence span [{start}, {end}) exceeds document length {}",
                chars.char_len()
            )));
        }
        Ok(Self {
            text: chars.slice(document, Span::new(start, end)).to_string(),
            start,
            end,
        })
    }

    /// Length in chars.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Counters and dropped candidates gathered during extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Candidates generated before mapping
    pub candidates: usize,
    /// Candidates rejected by the junk-span filter
    pub filtered: usize,
    /// Spans removed by overlap resolution (including exact duplicates)
    pub resolved_away: usize,
    /// Candidates whose offsets could not be mapped
    pub dropped: Vec<DroppedCandidate>,
}

impl Diagnostics {
    fn merge(&mut self, other: Diagnostics) {
        self.candidates += other.candidates;
        self.filtered += other.filtered;
        self.resolved_away += other.resolved_away;
        self.dropped.extend(other.dropped);
    }
}

/// Extraction output for one sentence or document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Finalized spans, grouped by sentence, in document order
    pub entities: Vec<EntitySpan>,
    /// What happened on the way
    pub diagnostics: Diagnostics,
}

/// Runs the matching pipeline against a borrowed [`LexiconIndex`].
///
/// # Example
///
/// ```rust
/// use clinspan::{EntityType, Extractor, LexiconIndex, LexiconRecord, Sentence};
///
/// let index = LexiconIndex::build(vec![
///     LexiconRecord::new("dor epigástrica", EntityType::Symptom, 1),
///     LexiconRecord::new("dor", EntityType::Symptom, 2),
/// ]);
/// let extractor = Extractor::new(&index);
/// let out = extractor.extract_sentence(&Sentence::new("Paciente refere dor epigástrica intensa", 0), 0);
///
/// assert_eq!(out.entities.len(), 1);
/// assert_eq!(out.entities[0].surface_text, "dor epigástrica");
/// ```
#[derive(Debug, Clone)]
pub struct Extractor<'i> {
    index: &'i LexiconIndex,
    normalizer: Normalizer,
    generator: CandidateGenerator,
    resolver: OverlapResolver,
    filter: Option<EntityFilter>,
}

impl<'i> Extractor<'i> {
    /// Create an extractor with the default configuration.
    #[must_use]
    pub fn new(index: &'i LexiconIndex) -> Self {
        Self {
            index,
            normalizer: Normalizer::new(),
            generator: CandidateGenerator::default(),
            resolver: OverlapResolver::new(),
            filter: None,
        }
    }

    /// Create an extractor from a validated configuration.
    pub fn with_config(index: &'i LexiconIndex, config: &ExtractorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            index,
            normalizer: Normalizer::new(),
            generator: CandidateGenerator::from_config(config),
            resolver: OverlapResolver::new(),
            filter: config.filter.as_ref().map(EntityFilter::new),
        })
    }

    /// The index this extractor reads.
    #[must_use]
    pub fn index(&self) -> &LexiconIndex {
        self.index
    }

    /// Extract conflict-free spans from one sentence.
    #[must_use]
    pub fn extract_sentence(&self, sentence: &Sentence, sentence_id: usize) -> Extraction {
        let normalized = self.normalizer.normalize(&sentence.text);
        let input = SentenceInput {
            id: sentence_id,
            text: &sentence.text,
            normalized: &normalized,
        };

        let candidates = self.generator.find_candidates(&input, self.index);
        let mut diagnostics = Diagnostics {
            candidates: candidates.len(),
            ..Diagnostics::default()
        };

        let sentence_len = sentence.text.chars().count();
        let mapper = SpanMapper::new(&normalized, sentence.start, sentence_len);
        let (mapped, dropped) = mapper.map_all(candidates);
        diagnostics.dropped = dropped;

        let mut spans: Vec<EntitySpan> = mapped
            .into_iter()
            .map(|(candidate, span)| {
                let local_start = span.start - sentence.start;
                let local_end = span.end - sentence.start;
                EntitySpan {
                    start: span.start,
                    end: span.end,
                    surface_text: char_slice(&sentence.text, local_start, local_end).to_string(),
                    entity_type: candidate.entity_type,
                    score: candidate.score,
                    kind: candidate.kind,
                    evidence_sentence: sentence.text.clone(),
                    sentence_id,
                    source: candidate.source,
                    priority: candidate.priority,
                }
            })
            .collect();

        if let Some(filter) = &self.filter {
            let before = spans.len();
            spans = filter.filter(spans);
            diagnostics.filtered = before - spans.len();
        }

        let before = spans.len();
        let entities = self.resolver.resolve(spans);
        diagnostics.resolved_away = before - entities.len();

        debug!(
            "sentence {}: {} candidates, {} dropped, {} filtered, {} entities",
            sentence_id,
            diagnostics.candidates,
            diagnostics.dropped.len(),
            diagnostics.filtered,
            entities.len()
        );

        Extraction {
            entities,
            diagnostics,
        }
    }

    /// Extract spans from a document given as ordered, non-overlapping sentences.
    ///
    /// Sentence ids are positions in `sentences`.
    #[must_use]
    pub fn extract_document(&self, sentences: &[Sentence]) -> Extraction {
        let mut out = Extraction::default();
        for (id, sentence) in sentences.iter().enumerate() {
            let part = self.extract_sentence(sentence, id);
            out.entities.extend(part.entities);
            out.diagnostics.merge(part.diagnostics);
        }
        out
    }

    /// Extract many documents in parallel. Output order is input order.
    #[cfg(feature = "parallel")]
    #[must_use]
    pub fn extract_documents(&self, documents: &[Vec<Sentence>]) -> Vec<Extraction> {
        use rayon::prelude::*;
        documents
            .par_iter()
            .map(|sentences| self.extract_document(sentences))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LexiconRecord;
    use crate::postprocess::FilterConfig;
    use crate::types::{EntityType, MatchKind};

    fn index() -> LexiconIndex {
        LexiconIndex::build(vec![
            LexiconRecord::new("dor epigástrica", EntityType::Symptom, 1),
            LexiconRecord::new("dor", EntityType::Symptom, 2),
            LexiconRecord::new("abdome", EntityType::Anatomy, 1),
            LexiconRecord::new("refere", EntityType::Symptom, 5),
        ])
    }

    #[test]
    fn test_sentence_offsets_shift_into_document() {
        let index = index();
        let extractor = Extractor::new(&index);
        let doc = "Sem queixas. Refere DOR no abdome.";
        let sentences = vec![
            Sentence::from_document(doc, 0, 12).unwrap(),
            Sentence::from_document(doc, 13, 34).unwrap(),
        ];
        let out = extractor.extract_document(&sentences);
        let surfaces: Vec<_> = out.entities.iter().map(|e| e.surface_text.as_str()).collect();
        assert_eq!(surfaces, vec!["Refere", "DOR", "abdome"]);

        let dor = &out.entities[1];
        assert_eq!((dor.start, dor.end), (20, 23));
        assert_eq!(dor.sentence_id, 1);
        assert_eq!(dor.evidence_sentence, "Refere DOR no abdome.");
        let chars: String = doc.chars().skip(dor.start).take(dor.len()).collect();
        assert_eq!(chars, "DOR");
    }

    #[test]
    fn test_sentence_span_must_be_inside_document() {
        let doc = "Nega febre.";
        let err = Sentence::from_document(doc, 4, 4).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        let err = Sentence::from_document(doc, 5, 12).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input: sentence span [5, 12) exceeds document length 11"
        );
        assert_eq!(Sentence::from_document(doc, 5, 11).unwrap().text, "febre.");
    }

    #[test]
    fn test_filter_removes_junk_before_resolution() {
        let index = index();
        let config = ExtractorConfig::default().with_filter(FilterConfig::default());
        let extractor = Extractor::with_config(&index, &config).unwrap();
        let out = extractor.extract_sentence(&Sentence::new("Refere dor no abdome", 0), 0);
        // "refere" is a stopword and "dor" is too short
        assert_eq!(out.entities.len(), 1);
        assert_eq!(out.entities[0].entity_type, EntityType::Anatomy);
        assert_eq!(out.diagnostics.filtered, 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let index = index();
        let mut config = ExtractorConfig::default();
        config.fuzzy.threshold = -0.1;
        assert!(Extractor::with_config(&index, &config).is_err());
    }

    #[test]
    fn test_diagnostics_count_resolution() {
        let index = index();
        let out = Extractor::new(&index)
            .extract_sentence(&Sentence::new("paciente refere dor epigastrica intensa", 0), 0);
        let kinds: Vec<_> = out.entities.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![MatchKind::Token, MatchKind::ExactPhrase]);
        // the "dor" token candidate lost to the phrase
        assert_eq!(out.diagnostics.resolved_away, 1);
        assert!(out.diagnostics.dropped.is_empty());
    }

    #[test]
    fn test_empty_sentence() {
        let index = index();
        let out = Extractor::new(&index).extract_sentence(&Sentence::new("", 5), 0);
        assert!(out.entities.is_empty());
        assert_eq!(out.diagnostics.candidates, 0);
    }
}
