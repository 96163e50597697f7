//! Span-level evaluation of predicted entities against reference annotations.
//!
//! # Pipeline
//!
//! ```text
//! gold docs ─┐                       per document, per type
//!            ├─ align by doc_id ──▶  is_match (mode, θ) ──▶ greedy pairing
//! pred docs ─┘   (missing-doc policy)                        │
//!                                                            ▼
//!                                     TP / FP / FN + assertion confusion
//!                                                            │
//!                                                            ▼
//!                                     CorpusReport (per type + micro)
//! ```
//!
//! Evaluation is independent of extraction: both sides are plain
//! [`EvalEntity`] collections, possibly produced by different runs or tools.
//!
//! # Example
//!
//! ```rust
//! use clinspan::eval::{evaluate_document, EvalConfig, EvalEntity, MatchMode};
//! use clinspan::EntityType;
//!
//! let gold = vec![EvalEntity::new(20, 36, "dor epigástrica", EntityType::Symptom)];
//! let pred = vec![EvalEntity::new(20, 28, "dor epig", EntityType::Symptom)];
//!
//! let lenient = EvalConfig::default().with_mode(MatchMode::IouOrMinCovOrContainment);
//! let eval = evaluate_document(&gold, &pred, &lenient);
//! assert_eq!(eval.counts().tp, 1);
//!
//! let strict_iou = EvalConfig::default().with_threshold(0.6);
//! let eval = evaluate_document(&gold, &pred, &strict_iou);
//! assert_eq!(eval.counts().tp, 0);
//! ```

mod corpus;
mod matching;
mod metrics;
mod modes;

pub use corpus::{evaluate_corpus, CorpusReport, DocumentReport};
pub use matching::{assign, MatchResult};
pub use metrics::{
    evaluate_document, AssertionConfusion, Counts, DocumentEvaluation, TypeEvaluation,
};
pub use modes::{is_match, match_reason, MatchMode, MatchReason};

use crate::offset::Span;
use crate::types::{EntitySpan, EntityType};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Assertion status attached to an entity downstream of extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum AssertionLabel {
    /// Affirmed (also used for missing or unknown labels)
    #[default]
    Present,
    /// Explicitly denied
    Negated,
    /// Hedged or suspected
    Possible,
    /// Past history
    Historical,
}

impl AssertionLabel {
    /// Every label, in canonical order.
    pub const ALL: [AssertionLabel; 4] = [
        AssertionLabel::Present,
        AssertionLabel::Negated,
        AssertionLabel::Possible,
        AssertionLabel::Historical,
    ];

    /// Parse a label; missing or unknown labels become `Present`.
    #[must_use]
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|l| l.trim().to_uppercase()).as_deref() {
            Some("NEGATED") => AssertionLabel::Negated,
            Some("POSSIBLE") => AssertionLabel::Possible,
            Some("HISTORICAL") => AssertionLabel::Historical,
            _ => AssertionLabel::Present,
        }
    }

    /// Canonical upper-case label.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            AssertionLabel::Present => "PRESENT",
            AssertionLabel::Negated => "NEGATED",
            AssertionLabel::Possible => "POSSIBLE",
            AssertionLabel::Historical => "HISTORICAL",
        }
    }

    pub(crate) const fn index(&self) -> usize {
        match self {
            AssertionLabel::Present => 0,
            AssertionLabel::Negated => 1,
            AssertionLabel::Possible => 2,
            AssertionLabel::Historical => 3,
        }
    }
}

impl From<Option<String>> for AssertionLabel {
    fn from(label: Option<String>) -> Self {
        Self::from_label(label.as_deref())
    }
}

impl From<AssertionLabel> for String {
    fn from(label: AssertionLabel) -> Self {
        label.as_label().to_string()
    }
}

impl std::fmt::Display for AssertionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// An entity on either side of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalEntity {
    /// Start (char offset, inclusive)
    pub start: usize,
    /// End (char offset, exclusive)
    pub end: usize,
    /// Surface text
    #[serde(default, alias = "surface_text")]
    pub text: String,
    /// Entity type
    #[serde(alias = "type")]
    pub entity_type: EntityType,
    /// Assertion status
    #[serde(default)]
    pub assertion: AssertionLabel,
}

/// Reference annotation.
pub type GoldEntity = EvalEntity;
/// Predicted annotation.
pub type PredEntity = EvalEntity;

impl EvalEntity {
    /// Create an entity with `Present` assertion.
    #[must_use]
    pub fn new(start: usize, end: usize, text: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            entity_type,
            assertion: AssertionLabel::Present,
        }
    }

    /// Set the assertion label.
    #[must_use]
    pub fn with_assertion(mut self, assertion: AssertionLabel) -> Self {
        self.assertion = assertion;
        self
    }

    /// Entity range.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

impl From<&EntitySpan> for EvalEntity {
    fn from(span: &EntitySpan) -> Self {
        Self::new(span.start, span.end, span.surface_text.clone(), span.entity_type)
    }
}

/// One document's entities on one side of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalDocument {
    /// Document id used to align the two sides
    #[serde(alias = "case_id")]
    pub doc_id: String,
    /// Entities
    #[serde(default)]
    pub entities: Vec<EvalEntity>,
}

impl EvalDocument {
    /// Create a document.
    #[must_use]
    pub fn new(doc_id: impl Into<String>, entities: Vec<EvalEntity>) -> Self {
        Self {
            doc_id: doc_id.into(),
            entities,
        }
    }
}

/// What to do with a document present on only one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDocumentPolicy {
    /// Missing predictions count as FN, missing gold as FP
    #[default]
    CountAsUnmatched,
    /// Leave the document out and report its id
    Skip,
    /// Fail the evaluation
    Error,
}

/// Evaluation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Matching rule
    pub mode: MatchMode,
    /// Overlap threshold θ in [0, 1]
    pub threshold: f64,
    /// Handling of unaligned documents
    pub missing_documents: MissingDocumentPolicy,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::Iou,
            threshold: 0.5,
            missing_documents: MissingDocumentPolicy::CountAsUnmatched,
        }
    }
}

impl EvalConfig {
    /// Set the matching mode.
    #[must_use]
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the overlap threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the missing-document policy.
    #[must_use]
    pub fn with_missing_documents(mut self, policy: MissingDocumentPolicy) -> Self {
        self.missing_documents = policy;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::config(format!(
                "eval threshold must be in [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Load from a JSON file and validate.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_label_normalization() {
        assert_eq!(AssertionLabel::from_label(None), AssertionLabel::Present);
        assert_eq!(AssertionLabel::from_label(Some("negated")), AssertionLabel::Negated);
        assert_eq!(AssertionLabel::from_label(Some(" Historical ")), AssertionLabel::Historical);
        assert_eq!(AssertionLabel::from_label(Some("maybe")), AssertionLabel::Present);
    }

    #[test]
    fn test_eval_entity_serde() {
        let e: EvalEntity =
            serde_json::from_str(r#"{"start": 0, "end": 5, "type": "DIAGNOSIS", "assertion": null}"#)
                .unwrap();
        assert_eq!(e.entity_type, EntityType::Problem);
        assert_eq!(e.assertion, AssertionLabel::Present);
        assert_eq!(e.text, "");

        let e: EvalEntity = serde_json::from_str(
            r#"{"start": 0, "end": 5, "entity_type": "SYMPTOM", "assertion": "possible"}"#,
        )
        .unwrap();
        assert_eq!(e.assertion, AssertionLabel::Possible);
        let back = serde_json::to_value(&e).unwrap();
        assert_eq!(back["assertion"], "POSSIBLE");
    }

    #[test]
    fn test_eval_config_defaults_and_validation() {
        let config = EvalConfig::default();
        assert_eq!(config.mode, MatchMode::Iou);
        assert!((config.threshold - 0.5).abs() < 1e-12);
        assert!(config.validate().is_ok());
        assert!(EvalConfig::default().with_threshold(2.0).validate().is_err());

        let parsed: EvalConfig =
            serde_json::from_str(r#"{"mode": "iou_or_containment", "missing_documents": "skip"}"#)
                .unwrap();
        assert_eq!(parsed.mode, MatchMode::IouOrContainment);
        assert_eq!(parsed.missing_documents, MissingDocumentPolicy::Skip);
    }
}
