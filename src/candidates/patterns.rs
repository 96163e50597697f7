//! Fixed clinical shape patterns (vital signs, scores, bedside exams).
//!
//! Lexicon-independent and scanned over the original sentence text, so the
//! offsets they produce never go through the normalization alignment.

use crate::offset::{CharIndex, Span};
use crate::types::{EntityType, PatternId};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// One row of the pattern table.
#[derive(Debug)]
pub struct ClinicalPattern {
    /// Stable name, used in logs and CLI output
    pub name: &'static str,
    /// Type assigned to every match
    pub entity_type: EntityType,
    regex: Regex,
}

impl ClinicalPattern {
    fn new(name: &'static str, entity_type: EntityType, pattern: &str) -> Self {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("valid clinical pattern");
        Self {
            name,
            entity_type,
            regex,
        }
    }
}

static PATTERNS: Lazy<Vec<ClinicalPattern>> = Lazy::new(|| {
    vec![
        // GCS 15, Glasgow: 14, ECG=9
        ClinicalPattern::new(
            "glasgow_coma_scale",
            EntityType::Test,
            r"\b(?:GCS|Glasgow|ECG)\s*(?:=|:)?\s*(?:[3-9]|1[0-5])\b",
        ),
        // PA 120x70, 120/70, 120 x 70
        ClinicalPattern::new(
            "blood_pressure",
            EntityType::Test,
            r"\b(?:PA\s*)?\d{2,3}\s*(?:x|/)\s*\d{2,3}\b",
        ),
        // FC 86, pulso 112 bpm
        ClinicalPattern::new(
            "heart_rate",
            EntityType::Test,
            r"\b(?:FC|frequ[eê]ncia\s*card[ií]aca|pulso)\s*[:=]?\s*\d{2,3}\s*(?:bpm)?\b",
        ),
        // FR 16 irpm
        ClinicalPattern::new(
            "respiratory_rate",
            EntityType::Test,
            r"\b(?:FR|frequ[eê]ncia\s*respirat[óo]ria)\s*[:=]?\s*\d{1,3}\s*(?:irpm|rpm|ipm)?\b",
        ),
        // sat 98%, saturação 97%
        ClinicalPattern::new(
            "oxygen_saturation",
            EntityType::Test,
            r"\b(?:sat|saturação|saturacao|SpO2)\s*[:=]?\s*\d{2,3}(?:\s*%|\b)",
        ),
        ClinicalPattern::new("fast_exam", EntityType::Procedure, r"\bFAST\b"),
    ]
});

/// The pattern table, indexed by [`PatternId`].
#[must_use]
pub fn patterns() -> &'static [ClinicalPattern] {
    &PATTERNS
}

/// Every pattern match in `text`, as char spans, in table then text order.
#[must_use]
pub fn find_pattern_spans(text: &str) -> Vec<(PatternId, Span)> {
    let chars = CharIndex::new(text);
    let mut found = Vec::new();
    for (id, pattern) in PATTERNS.iter().enumerate() {
        for m in pattern.regex.find_iter(text) {
            let span = chars.span_from_bytes(m.start(), m.end());
            if !span.is_empty() {
                found.push((id, span));
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surfaces(text: &str) -> Vec<(&'static str, String)> {
        let chars = CharIndex::new(text);
        find_pattern_spans(text)
            .into_iter()
            .map(|(id, span)| (patterns()[id].name, chars.slice(text, span).to_string()))
            .collect()
    }

    #[test]
    fn test_vital_signs() {
        let found = surfaces("PA 120x80, FC 86 bpm, FR 16 irpm, sat 98% em ar ambiente");
        assert!(found.contains(&("blood_pressure", "PA 120x80".to_string())));
        assert!(found.contains(&("heart_rate", "FC 86 bpm".to_string())));
        assert!(found.contains(&("respiratory_rate", "FR 16 irpm".to_string())));
        assert!(found.contains(&("oxygen_saturation", "sat 98%".to_string())));
    }

    #[test]
    fn test_saturation_keeps_percent_sign() {
        assert_eq!(
            surfaces("Sat 98% em ar ambiente"),
            vec![("oxygen_saturation", "Sat 98%".to_string())]
        );
        assert_eq!(
            surfaces("SpO2: 95 %"),
            vec![("oxygen_saturation", "SpO2: 95 %".to_string())]
        );
        assert_eq!(
            surfaces("saturacao 97"),
            vec![("oxygen_saturation", "saturacao 97".to_string())]
        );
    }

    #[test]
    fn test_glasgow_range() {
        let found = surfaces("Glasgow 15, GCS: 3, ECG 2");
        let gcs: Vec<_> = found.iter().filter(|(n, _)| *n == "glasgow_coma_scale").collect();
        assert_eq!(gcs.len(), 2);
    }

    #[test]
    fn test_char_offsets_after_accents() {
        let text = "Saturação 97% e FAST negativo";
        let spans = find_pattern_spans(text);
        let fast = spans
            .iter()
            .find(|(id, _)| patterns()[*id].name == "fast_exam")
            .unwrap();
        assert_eq!(fast.1, Span::new(16, 20));
        assert_eq!(patterns()[fast.0].entity_type, EntityType::Procedure);
    }

    #[test]
    fn test_no_match_on_plain_text() {
        assert!(find_pattern_spans("paciente refere dor epigástrica").is_empty());
    }
}
