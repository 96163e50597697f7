//! Greedy one-to-one pairing of gold and predicted entities.
//!
//! Every compatible pair (per [`super::is_match`]) is ranked by:
//!
//! 1. strength desc (IoU; 1.0 for exact or containment-only matches)
//! 2. `|gold.start − pred.start|` asc
//! 3. gold index asc
//! 4. pred index asc
//!
//! and accepted in that order when neither side is used yet. This is an
//! approximation of maximum-weight bipartite matching, but it is fully
//! deterministic.

use super::modes::{match_reason, strength, MatchReason};
use super::{EvalConfig, EvalEntity};
use serde::{Deserialize, Serialize};

/// Pairing of one gold and one predicted collection.
///
/// Indices refer to positions in the collections passed to [`assign`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// `(gold_index, pred_index)`, ordered by gold index
    pub pairs: Vec<(usize, usize)>,
    /// Rule that matched each pair, aligned with `pairs`
    pub reasons: Vec<MatchReason>,
    /// Gold indices left unpaired (false negatives), ascending
    pub unmatched_gold: Vec<usize>,
    /// Pred indices left unpaired (false positives), ascending
    pub unmatched_pred: Vec<usize>,
}

struct Compatible {
    gold: usize,
    pred: usize,
    reason: MatchReason,
    strength: f64,
    start_distance: usize,
}

/// Pair `gold` with `pred` under `config`. Each entity is used at most once.
#[must_use]
pub fn assign(gold: &[EvalEntity], pred: &[EvalEntity], config: &EvalConfig) -> MatchResult {
    let mut compatible = Vec::new();
    for (gi, g) in gold.iter().enumerate() {
        for (pi, p) in pred.iter().enumerate() {
            if let Some(reason) = match_reason(g, p, config.mode, config.threshold) {
                compatible.push(Compatible {
                    gold: gi,
                    pred: pi,
                    reason,
                    strength: strength(g, p, reason),
                    start_distance: g.start.abs_diff(p.start),
                });
            }
        }
    }

    compatible.sort_by(|a, b| {
        b.strength
            .total_cmp(&a.strength)
            .then_with(|| a.start_distance.cmp(&b.start_distance))
            .then_with(|| a.gold.cmp(&b.gold))
            .then_with(|| a.pred.cmp(&b.pred))
    });

    let mut gold_used = vec![false; gold.len()];
    let mut pred_used = vec![false; pred.len()];
    let mut accepted: Vec<(usize, usize, MatchReason)> = Vec::new();
    for c in compatible {
        if gold_used[c.gold] || pred_used[c.pred] {
            continue;
        }
        gold_used[c.gold] = true;
        pred_used[c.pred] = true;
        accepted.push((c.gold, c.pred, c.reason));
    }
    accepted.sort_by_key(|&(g, p, _)| (g, p));

    MatchResult {
        pairs: accepted.iter().map(|&(g, p, _)| (g, p)).collect(),
        reasons: accepted.iter().map(|&(_, _, r)| r).collect(),
        unmatched_gold: unused(&gold_used),
        unmatched_pred: unused(&pred_used),
    }
}

fn unused(used: &[bool]) -> Vec<usize> {
    used.iter()
        .enumerate()
        .filter(|(_, &u)| !u)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::MatchMode;
    use crate::types::EntityType;

    fn e(start: usize, end: usize) -> EvalEntity {
        EvalEntity::new(start, end, "", EntityType::Problem)
    }

    #[test]
    fn test_greedy_prefers_stronger_pair() {
        // pred 0 overlaps both golds; gold 1 is its stronger partner
        let gold = vec![e(0, 10), e(2, 10)];
        let pred = vec![e(2, 10), e(0, 6)];
        let result = assign(&gold, &pred, &EvalConfig::default());
        assert_eq!(result.pairs, vec![(0, 1), (1, 0)]);
        assert!(result.unmatched_gold.is_empty());
        assert!(result.unmatched_pred.is_empty());
    }

    #[test]
    fn test_each_entity_used_once() {
        let gold = vec![e(0, 10)];
        let pred = vec![e(0, 10), e(0, 9)];
        let result = assign(&gold, &pred, &EvalConfig::default());
        assert_eq!(result.pairs, vec![(0, 0)]);
        assert_eq!(result.unmatched_pred, vec![1]);
    }

    #[test]
    fn test_start_distance_breaks_ties() {
        // both preds have IoU 10/15 with gold; pred 1 starts closer
        let gold = vec![e(10, 20)];
        let pred = vec![e(5, 20), e(10, 25)];
        let result = assign(&gold, &pred, &EvalConfig::default());
        assert_eq!(result.pairs, vec![(0, 1)]);
        assert_eq!(result.reasons, vec![MatchReason::Iou]);
        assert_eq!(result.unmatched_pred, vec![0]);
    }

    #[test]
    fn test_exact_pair_beats_partial() {
        let gold = vec![e(10, 20)];
        let pred = vec![e(12, 22), e(10, 20)];
        let config = EvalConfig::default().with_mode(MatchMode::IouOrContainment);
        let result = assign(&gold, &pred, &config);
        assert_eq!(result.pairs, vec![(0, 1)]);
    }

    #[test]
    fn test_containment_strength_is_one() {
        let gold = vec![e(0, 20)];
        // pred 0: IoU 0.5 exactly; pred 1: contained, IoU 0.25
        let pred = vec![e(0, 10), e(5, 10)];
        let config = EvalConfig::default()
            .with_mode(MatchMode::IouOrContainment)
            .with_threshold(0.5);
        let result = assign(&gold, &pred, &config);
        // pred 0 matched via IoU (strength 0.5) loses to containment-only pred 1 (strength 1.0)
        assert_eq!(result.pairs, vec![(0, 1)]);
        assert_eq!(result.reasons, vec![MatchReason::Containment]);
    }

    #[test]
    fn test_empty_sides() {
        let result = assign(&[], &[e(0, 3)], &EvalConfig::default());
        assert!(result.pairs.is_empty());
        assert_eq!(result.unmatched_pred, vec![0]);
    }
}
