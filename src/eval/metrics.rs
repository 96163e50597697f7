//! Counts, derived scores and assertion confusion.
//!
//! Precision, recall and F1 are 0.0 when their denominator is zero; an
//! empty evaluation scores zero rather than NaN.

use super::matching::{assign, MatchResult};
use super::{AssertionLabel, EvalConfig, EvalEntity};
use crate::types::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// True positives, false positives and false negatives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// Matched pairs
    pub tp: usize,
    /// Unmatched predictions
    pub fp: usize,
    /// Unmatched gold entities
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl Counts {
    /// Create counts.
    #[must_use]
    pub const fn new(tp: usize, fp: usize, fn_: usize) -> Self {
        Self { tp, fp, fn_ }
    }

    /// `tp / (tp + fp)`.
    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// `tp / (tp + fn)`.
    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Harmonic mean of precision and recall.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Add another set of counts into this one.
    pub fn merge(&mut self, other: &Counts) {
        self.tp += other.tp;
        self.fp += other.fp;
        self.fn_ += other.fn_;
    }

    fn from_result(result: &MatchResult) -> Self {
        Self::new(
            result.pairs.len(),
            result.unmatched_pred.len(),
            result.unmatched_gold.len(),
        )
    }
}

impl std::ops::Add for Counts {
    type Output = Counts;

    fn add(mut self, rhs: Counts) -> Counts {
        self.merge(&rhs);
        self
    }
}

impl std::iter::Sum for Counts {
    fn sum<I: Iterator<Item = Counts>>(iter: I) -> Self {
        iter.fold(Counts::default(), |acc, c| acc + c)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Gold assertion label × predicted assertion label over matched pairs.
///
/// Rows are gold labels, columns predicted labels, both in
/// [`AssertionLabel::ALL`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionConfusion {
    /// `matrix[gold][pred]`
    pub matrix: [[usize; 4]; 4],
}

impl AssertionConfusion {
    /// Record one matched pair.
    pub fn record(&mut self, gold: AssertionLabel, pred: AssertionLabel) {
        self.matrix[gold.index()][pred.index()] += 1;
    }

    /// Cell count.
    #[must_use]
    pub fn get(&self, gold: AssertionLabel, pred: AssertionLabel) -> usize {
        self.matrix[gold.index()][pred.index()]
    }

    /// Number of recorded pairs.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Fraction of pairs on the diagonal; 0.0 when empty.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let diagonal = (0..4).map(|i| self.matrix[i][i]).sum();
        ratio(diagonal, self.total())
    }

    /// Add another matrix into this one.
    pub fn merge(&mut self, other: &AssertionConfusion) {
        for (row, other_row) in self.matrix.iter_mut().zip(other.matrix.iter()) {
            for (cell, other_cell) in row.iter_mut().zip(other_row.iter()) {
                *cell += other_cell;
            }
        }
    }
}

/// Evaluation of one entity type within one document.
///
/// `result` indices point into the document's full gold/pred collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeEvaluation {
    /// Entity type
    pub entity_type: EntityType,
    /// Pairing
    pub result: MatchResult,
    /// TP/FP/FN
    pub counts: Counts,
    /// Assertion confusion over matched pairs
    pub confusion: AssertionConfusion,
}

/// Evaluation of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentEvaluation {
    /// One entry per type present on either side, in type order
    pub types: Vec<TypeEvaluation>,
}

impl DocumentEvaluation {
    /// Counts summed over types.
    #[must_use]
    pub fn counts(&self) -> Counts {
        self.types.iter().map(|t| t.counts).sum()
    }

    /// Confusion merged over types.
    #[must_use]
    pub fn confusion(&self) -> AssertionConfusion {
        let mut merged = AssertionConfusion::default();
        for t in &self.types {
            merged.merge(&t.confusion);
        }
        merged
    }

    /// Evaluation for one type, if it occurred.
    #[must_use]
    pub fn get(&self, entity_type: EntityType) -> Option<&TypeEvaluation> {
        self.types.iter().find(|t| t.entity_type == entity_type)
    }
}

/// Evaluate one document's predictions against its gold entities.
#[must_use]
pub fn evaluate_document(
    gold: &[EvalEntity],
    pred: &[EvalEntity],
    config: &EvalConfig,
) -> DocumentEvaluation {
    let types: BTreeSet<EntityType> = gold
        .iter()
        .chain(pred.iter())
        .map(|e| e.entity_type)
        .collect();

    let types = types
        .into_iter()
        .map(|ty| evaluate_type(gold, pred, ty, config))
        .collect();
    DocumentEvaluation { types }
}

fn evaluate_type(
    gold: &[EvalEntity],
    pred: &[EvalEntity],
    entity_type: EntityType,
    config: &EvalConfig,
) -> TypeEvaluation {
    let gold_idx = indices_of(gold, entity_type);
    let pred_idx = indices_of(pred, entity_type);
    let gold_sub: Vec<EvalEntity> = gold_idx.iter().map(|&i| gold[i].clone()).collect();
    let pred_sub: Vec<EvalEntity> = pred_idx.iter().map(|&i| pred[i].clone()).collect();

    let local = assign(&gold_sub, &pred_sub, config);
    let result = MatchResult {
        pairs: local
            .pairs
            .iter()
            .map(|&(g, p)| (gold_idx[g], pred_idx[p]))
            .collect(),
        reasons: local.reasons,
        unmatched_gold: local.unmatched_gold.iter().map(|&g| gold_idx[g]).collect(),
        unmatched_pred: local.unmatched_pred.iter().map(|&p| pred_idx[p]).collect(),
    };

    let mut confusion = AssertionConfusion::default();
    for &(g, p) in &result.pairs {
        confusion.record(gold[g].assertion, pred[p].assertion);
    }

    TypeEvaluation {
        entity_type,
        counts: Counts::from_result(&result),
        result,
        confusion,
    }
}

fn indices_of(entities: &[EvalEntity], entity_type: EntityType) -> Vec<usize> {
    entities
        .iter()
        .enumerate()
        .filter(|(_, e)| e.entity_type == entity_type)
        .map(|(i, _)| i)
        .collect()
}
