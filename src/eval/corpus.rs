//! Corpus-level evaluation: document alignment and aggregation.

use super::metrics::{evaluate_document, AssertionConfusion, Counts, DocumentEvaluation};
use super::{EvalConfig, EvalDocument, EvalEntity, MissingDocumentPolicy};
use crate::types::EntityType;
use crate::{Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Evaluation of one aligned document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Document id
    pub doc_id: String,
    /// Per-type results
    pub evaluation: DocumentEvaluation,
}

/// Aggregated evaluation over a corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusReport {
    /// Evaluated documents, in gold order then prediction-only documents
    pub documents: Vec<DocumentReport>,
    /// Counts per entity type
    pub per_type: BTreeMap<EntityType, Counts>,
    /// Counts summed over every type and document
    pub micro: Counts,
    /// Assertion confusion over every matched pair
    pub confusion: AssertionConfusion,
    /// Gold documents with no predictions
    pub missing_predictions: Vec<String>,
    /// Predicted documents with no gold
    pub missing_gold: Vec<String>,
}

impl CorpusReport {
    /// Unweighted mean of per-type F1.
    #[must_use]
    pub fn macro_f1(&self) -> f64 {
        if self.per_type.is_empty() {
            return 0.0;
        }
        self.per_type.values().map(Counts::f1).sum::<f64>() / self.per_type.len() as f64
    }

    fn absorb(&mut self, doc_id: &str, evaluation: DocumentEvaluation) {
        for t in &evaluation.types {
            self.per_type.entry(t.entity_type).or_default().merge(&t.counts);
            self.micro.merge(&t.counts);
            self.confusion.merge(&t.confusion);
        }
        self.documents.push(DocumentReport {
            doc_id: doc_id.to_string(),
            evaluation,
        });
    }
}

/// Evaluate `pred_docs` against `gold_docs`, aligned by `doc_id`.
///
/// Documents present on one side only are handled per
/// [`EvalConfig::missing_documents`]. Duplicate ids on one side are merged.
///
/// # Errors
///
/// Invalid configuration, or unaligned documents under
/// [`MissingDocumentPolicy::Error`].
pub fn evaluate_corpus(
    gold_docs: &[EvalDocument],
    pred_docs: &[EvalDocument],
    config: &EvalConfig,
) -> Result<CorpusReport> {
    config.validate()?;

    let gold = group_by_id(gold_docs);
    let pred = group_by_id(pred_docs);

    let missing_predictions: Vec<String> = gold
        .order
        .iter()
        .filter(|id| !pred.entities.contains_key(id.as_str()))
        .cloned()
        .collect();
    let missing_gold: Vec<String> = pred
        .order
        .iter()
        .filter(|id| !gold.entities.contains_key(id.as_str()))
        .cloned()
        .collect();

    if !missing_predictions.is_empty() || !missing_gold.is_empty() {
        warn!(
            "{} gold documents without predictions, {} predicted documents without gold ({:?})",
            missing_predictions.len(),
            missing_gold.len(),
            config.missing_documents
        );
        if config.missing_documents == MissingDocumentPolicy::Error {
            let first = missing_predictions
                .first()
                .or_else(|| missing_gold.first())
                .map(String::as_str)
                .unwrap_or_default();
            return Err(Error::evaluation(format!(
                "document sets differ: {} without predictions, {} without gold (first: '{}')",
                missing_predictions.len(),
                missing_gold.len(),
                first
            )));
        }
    }

    let count_unaligned = config.missing_documents == MissingDocumentPolicy::CountAsUnmatched;
    let mut report = CorpusReport::default();

    for id in &gold.order {
        let gold_entities = &gold.entities[id.as_str()];
        match pred.entities.get(id.as_str()) {
            Some(pred_entities) => {
                report.absorb(id, evaluate_document(gold_entities, pred_entities, config));
            }
            None if count_unaligned => {
                report.absorb(id, evaluate_document(gold_entities, &[], config));
            }
            None => {}
        }
    }
    if count_unaligned {
        for id in &missing_gold {
            let pred_entities = &pred.entities[id.as_str()];
            report.absorb(id, evaluate_document(&[], pred_entities, config));
        }
    }

    report.missing_predictions = missing_predictions;
    report.missing_gold = missing_gold;

    debug!(
        "evaluated {} documents: tp={} fp={} fn={}",
        report.documents.len(),
        report.micro.tp,
        report.micro.fp,
        report.micro.fn_
    );
    Ok(report)
}

struct Grouped<'a> {
    order: Vec<String>,
    entities: HashMap<&'a str, Vec<EvalEntity>>,
}

fn group_by_id(docs: &[EvalDocument]) -> Grouped<'_> {
    let mut order = Vec::new();
    let mut entities: HashMap<&str, Vec<EvalEntity>> = HashMap::new();
    for doc in docs {
        let slot = entities.entry(doc.doc_id.as_str()).or_insert_with(|| {
            order.push(doc.doc_id.clone());
            Vec::new()
        });
        slot.extend(doc.entities.iter().cloned());
    }
    Grouped { order, entities }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, spans: &[(usize, usize, EntityType)]) -> EvalDocument {
        EvalDocument::new(
            id,
            spans
                .iter()
                .map(|&(s, e, ty)| EvalEntity::new(s, e, "", ty))
                .collect(),
        )
    }

    fn corpora() -> (Vec<EvalDocument>, Vec<EvalDocument>) {
        let gold = vec![
            doc("a", &[(0, 5, EntityType::Symptom), (10, 20, EntityType::Problem)]),
            doc("b", &[(0, 4, EntityType::Drug)]),
        ];
        let pred = vec![
            doc("a", &[(0, 5, EntityType::Symptom)]),
            doc("c", &[(3, 9, EntityType::Test)]),
        ];
        (gold, pred)
    }

    #[test]
    fn test_count_as_unmatched() {
        let (gold, pred) = corpora();
        let report = evaluate_corpus(&gold, &pred, &EvalConfig::default()).unwrap();
        assert_eq!(report.documents.len(), 3);
        assert_eq!(report.micro, Counts::new(1, 1, 2));
        assert_eq!(report.per_type[&EntityType::Drug], Counts::new(0, 0, 1));
        assert_eq!(report.per_type[&EntityType::Test], Counts::new(0, 1, 0));
        assert_eq!(report.missing_predictions, vec!["b".to_string()]);
        assert_eq!(report.missing_gold, vec!["c".to_string()]);
    }

    #[test]
    fn test_skip_policy_reports_ids() {
        let (gold, pred) = corpora();
        let config = EvalConfig::default().with_missing_documents(MissingDocumentPolicy::Skip);
        let report = evaluate_corpus(&gold, &pred, &config).unwrap();
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.micro, Counts::new(1, 0, 1));
        assert_eq!(report.missing_predictions, vec!["b".to_string()]);
        assert_eq!(report.missing_gold, vec!["c".to_string()]);
    }

    #[test]
    fn test_error_policy() {
        let (gold, pred) = corpora();
        let config = EvalConfig::default().with_missing_documents(MissingDocumentPolicy::Error);
        let err = evaluate_corpus(&gold, &pred, &config).unwrap_err();
        assert!(matches!(err, Error::Evaluation(_)));

        let aligned = vec![doc("a", &[])];
        assert!(evaluate_corpus(&aligned, &aligned, &config).is_ok());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let config = EvalConfig::default().with_threshold(-0.5);
        assert!(matches!(
            evaluate_corpus(&[], &[], &config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_merge() {
        let gold = vec![
            doc("a", &[(0, 5, EntityType::Symptom)]),
            doc("a", &[(10, 15, EntityType::Symptom)]),
        ];
        let pred = vec![doc("a", &[(10, 15, EntityType::Symptom), (0, 5, EntityType::Symptom)])];
        let report = evaluate_corpus(&gold, &pred, &EvalConfig::default()).unwrap();
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.micro, Counts::new(2, 0, 0));
        assert!((report.macro_f1() - 1.0).abs() < 1e-12);
    }
}
