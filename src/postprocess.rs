//! Optional junk-span filter.
//!
//! Applied to mapped spans before overlap resolution, so a rejected span can
//! never suppress a valid one. Disabled unless [`crate::ExtractorConfig`]
//! carries a [`FilterConfig`].
//!
//! Rules, in order:
//!
//! 1. Trimmed surface text shorter than `min_chars`, or without a single
//!    alphabetic character, is rejected (every type).
//! 2. Leading/trailing punctuation is trimmed off the span (`trim_punct`).
//! 3. For types in `apply_to_types` only: spans made of stopwords alone are
//!    rejected, and `SYMPTOM` spans must contain a clinical nucleus token.

use crate::normalize::Normalizer;
use crate::types::{EntitySpan, EntityType};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid word regex"));

/// Portuguese function words and charting verbs.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "o", "os", "as", "de", "da", "do", "das", "dos", "e", "em", "no", "na", "nos", "nas",
    "com", "sem", "por", "para", "ao", "aos", "à", "às", "um", "uma", "uns", "umas", "que", "se",
    "foi", "está", "esta", "relatando", "refere", "nega", "apresenta", "paciente", "pela",
    "pelo", "pelas", "pelos",
];

/// Tokens of which a symptom span must contain at least one.
pub const DEFAULT_SYMPTOM_NUCLEUS: &[&str] = &[
    "dor", "cefaleia", "cefalgia", "febre", "vômito", "náusea", "dispneia", "tosse", "diarreia",
    "disúria", "prostração", "astenia", "tontura", "sangramento", "prurido", "edema", "cansaço",
    "fadiga", "palpitação", "mal", "estar", "desconforto", "ardor", "queimação", "ardência",
    "formigamento", "parestesia", "anorexia", "perda", "ganho", "peso", "sede", "poliúria",
    "oligúria", "incontinência", "constipação", "obstipação", "flatulência", "hemorragia",
    "hematúria", "melena", "hematêmese", "hemoptise", "epistaxe", "síncope", "convulsão",
    "tremor", "rigidez", "espasmo", "câimbra", "cramp", "fraqueza", "debilidade", "mialgia",
    "artralgia", "cervicalgia", "lombalgia", "dorsalgia",
];

/// Filter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum trimmed surface length in chars
    pub min_chars: usize,
    /// Types the stopword and nucleus rules apply to
    pub apply_to_types: Vec<EntityType>,
    /// Stopwords (compared after normalization)
    pub stopwords: Vec<String>,
    /// Symptom nucleus tokens (compared after normalization)
    pub symptom_nucleus: Vec<String>,
    /// Trim leading/trailing punctuation off kept spans
    pub trim_punct: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_chars: 4,
            apply_to_types: vec![EntityType::Symptom],
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
            symptom_nucleus: DEFAULT_SYMPTOM_NUCLEUS.iter().map(|s| s.to_string()).collect(),
            trim_punct: true,
        }
    }
}

impl FilterConfig {
    /// Set the minimum length.
    #[must_use]
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Set the types the lexical rules apply to.
    #[must_use]
    pub fn with_apply_to_types(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.apply_to_types = types.into_iter().collect();
        self
    }

    /// Enable or disable punctuation trimming.
    #[must_use]
    pub fn with_trim_punct(mut self, trim: bool) -> Self {
        self.trim_punct = trim;
        self
    }
}

/// Compiled filter.
#[derive(Debug, Clone)]
pub struct EntityFilter {
    min_chars: usize,
    apply_to_types: HashSet<EntityType>,
    stopwords: HashSet<String>,
    nucleus: HashSet<String>,
    trim_punct: bool,
}

impl EntityFilter {
    /// Compile a filter; word lists are normalized once here.
    #[must_use]
    pub fn new(config: &FilterConfig) -> Self {
        let normalizer = Normalizer::new();
        let fold = |words: &[String]| -> HashSet<String> {
            words
                .iter()
                .map(|w| normalizer.normalize_str(w))
                .filter(|w| !w.is_empty())
                .collect()
        };
        Self {
            min_chars: config.min_chars,
            apply_to_types: config.apply_to_types.iter().copied().collect(),
            stopwords: fold(&config.stopwords),
            nucleus: fold(&config.symptom_nucleus),
            trim_punct: config.trim_punct,
        }
    }

    /// Keep, trim or reject one span.
    #[must_use]
    pub fn apply(&self, mut span: EntitySpan) -> Option<EntitySpan> {
        let trimmed = span.surface_text.trim();
        if trimmed.chars().count() < self.min_chars {
            debug!("filter: '{}' shorter than {} chars", trimmed, self.min_chars);
            return None;
        }
        if !trimmed.chars().any(char::is_alphabetic) {
            debug!("filter: '{}' has no alphabetic character", trimmed);
            return None;
        }

        if self.trim_punct {
            trim_punctuation(&mut span);
        }

        if !self.apply_to_types.contains(&span.entity_type) {
            return Some(span);
        }

        let normalizer = Normalizer::new();
        let tokens: Vec<String> = WORD
            .find_iter(&span.surface_text)
            .map(|m| normalizer.normalize_str(m.as_str()))
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() || tokens.iter().all(|t| self.stopwords.contains(t)) {
            debug!("filter: '{}' is stopwords only", span.surface_text);
            return None;
        }
        if span.entity_type == EntityType::Symptom
            && !tokens.iter().any(|t| self.nucleus.contains(t))
        {
            debug!("filter: symptom '{}' lacks a nucleus token", span.surface_text);
            return None;
        }
        Some(span)
    }

    /// Apply to a batch, keeping order.
    #[must_use]
    pub fn filter(&self, spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
        spans.into_iter().filter_map(|s| self.apply(s)).collect()
    }
}

fn is_punct(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}

fn trim_punctuation(span: &mut EntitySpan) {
    let chars: Vec<char> = span.surface_text.chars().collect();
    let lead = chars.iter().take_while(|&&c| is_punct(c)).count();
    if lead == chars.len() {
        return;
    }
    let trail = chars.iter().rev().take_while(|&&c| is_punct(c)).count();
    if lead == 0 && trail == 0 {
        return;
    }
    span.surface_text = chars[lead..chars.len() - trail].iter().collect();
    span.start += lead;
    span.end -= trail;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchKind, MatchSource};

    fn span(text: &str, start: usize, ty: EntityType) -> EntitySpan {
        EntitySpan {
            start,
            end: start + text.chars().count(),
            surface_text: text.to_string(),
            entity_type: ty,
            score: 0.95,
            kind: MatchKind::Token,
            evidence_sentence: String::new(),
            sentence_id: 0,
            source: MatchSource::Entry(0),
            priority: 0,
        }
    }

    fn filter() -> EntityFilter {
        EntityFilter::new(&FilterConfig::default())
    }

    #[test]
    fn test_short_and_non_alphabetic_rejected() {
        let f = filter();
        assert!(f.apply(span("dor", 0, EntityType::Symptom)).is_none());
        assert!(f.apply(span("120/80", 0, EntityType::Test)).is_none());
        assert!(f.apply(span("GCS 15", 0, EntityType::Test)).is_some());
    }

    #[test]
    fn test_stopword_only_rejected() {
        let f = filter();
        assert!(f.apply(span("refere", 0, EntityType::Symptom)).is_none());
        // not in apply_to_types: the lexical rules are skipped
        assert!(f.apply(span("paciente", 0, EntityType::Anatomy)).is_some());
    }

    #[test]
    fn test_symptom_needs_nucleus() {
        let f = filter();
        assert!(f.apply(span("dor epigástrica", 0, EntityType::Symptom)).is_some());
        assert!(f.apply(span("Vomito", 0, EntityType::Symptom)).is_some());
        assert!(f.apply(span("abdome tenso", 0, EntityType::Symptom)).is_none());
    }

    #[test]
    fn test_trim_punctuation_moves_offsets() {
        let f = EntityFilter::new(&FilterConfig::default().with_apply_to_types([]));
        let kept = f.apply(span("(edema)", 10, EntityType::Problem)).unwrap();
        assert_eq!(kept.surface_text, "edema");
        assert_eq!((kept.start, kept.end), (11, 16));
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: FilterConfig = serde_json::from_str(r#"{"min_chars": 2}"#).unwrap();
        assert_eq!(config.min_chars, 2);
        assert!(config.trim_punct);
        assert_eq!(config.apply_to_types, vec![EntityType::Symptom]);
    }
}
