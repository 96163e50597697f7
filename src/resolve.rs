//! Overlap resolution within one sentence.
//!
//! # Algorithm
//!
//! 1. Collapse exact `(start, end, type)` duplicates. The representative is
//!    the best by pass precedence, then lower entry priority, and carries the
//!    group's maximum score.
//! 2. Sort by `(start asc, length desc, type, precedence desc, score desc, source)`.
//! 3. Sweep. A candidate is compared with every accepted span of the same
//!    type whose overlap ratio exceeds the limit:
//!
//! ```text
//!    accepted:  [====== dor epigastrica ======)
//!    candidate: [= dor =)                         ratio 3/3 = 1.0 > 0.5
//!               longer wins → candidate discarded
//!
//!    accepted:  [== pa 120x80 ==)
//!    candidate:            [== 80 fc 86 ==)       ratio 2/12 ≤ 0.5 → both kept
//! ```
//!
//!    The candidate survives only if it beats every such span, replacing them
//!    all. Spans of different types never conflict.
//! 4. Output in `(start, length desc, type, precedence)` order.
//!
//! Resolving an already resolved set returns it unchanged.

use crate::types::{EntitySpan, EntityType};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Same-type spans overlapping by more than this ratio conflict.
pub const MAX_OVERLAP_RATIO: f64 = 0.5;

#[derive(Debug, PartialEq, Eq)]
enum Resolution {
    KeepExisting,
    Replace,
}

/// Deduplicates and resolves spatial conflicts among one sentence's spans.
#[derive(Debug, Clone, Copy)]
pub struct OverlapResolver {
    max_overlap_ratio: f64,
}

impl Default for OverlapResolver {
    fn default() -> Self {
        Self {
            max_overlap_ratio: MAX_OVERLAP_RATIO,
        }
    }
}

impl OverlapResolver {
    /// Create a resolver with the standard overlap limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `spans` (original coordinates, one sentence) into a conflict-free set.
    ///
    /// # Example
    ///
    /// ```rust
    /// use clinspan::{EntitySpan, EntityType, MatchKind, MatchSource, OverlapResolver};
    ///
    /// let span = |start, end, kind| EntitySpan {
    ///     start,
    ///     end,
    ///     surface_text: String::new(),
    ///     entity_type: EntityType::Symptom,
    ///     score: 0.95,
    ///     kind,
    ///     evidence_sentence: String::new(),
    ///     sentence_id: 0,
    ///     source: MatchSource::Entry(0),
    ///     priority: 1,
    /// };
    /// let resolved = OverlapResolver::new().resolve(vec![
    ///     span(16, 19, MatchKind::Token),
    ///     span(16, 31, MatchKind::ExactPhrase),
    /// ]);
    /// assert_eq!(resolved.len(), 1);
    /// assert_eq!((resolved[0].start, resolved[0].end), (16, 31));
    /// ```
    #[must_use]
    pub fn resolve(&self, spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
        let mut candidates = dedup_exact(spans);
        candidates.sort_by(sweep_order);

        let mut accepted: Vec<EntitySpan> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let conflicts: Vec<usize> = accepted
                .iter()
                .enumerate()
                .filter(|(_, existing)| {
                    existing.entity_type == candidate.entity_type
                        && existing.span().min_coverage(&candidate.span()) > self.max_overlap_ratio
                })
                .map(|(i, _)| i)
                .collect();

            if conflicts.is_empty() {
                accepted.push(candidate);
                continue;
            }

            let wins_all = conflicts
                .iter()
                .all(|&i| compare(&accepted[i], &candidate) == Resolution::Replace);
            if wins_all {
                for &i in conflicts.iter().rev() {
                    accepted.remove(i);
                }
                accepted.push(candidate);
            }
        }

        accepted.sort_by(sweep_order);
        accepted
    }
}

/// Longer wins; tie → higher score; tie → pass precedence; tie → existing.
fn compare(existing: &EntitySpan, candidate: &EntitySpan) -> Resolution {
    let by_len = candidate.len().cmp(&existing.len());
    let by_score = candidate.score.total_cmp(&existing.score);
    let by_kind = candidate
        .kind
        .precedence()
        .cmp(&existing.kind.precedence());
    match by_len.then(by_score).then(by_kind) {
        Ordering::Greater => Resolution::Replace,
        Ordering::Less | Ordering::Equal => Resolution::KeepExisting,
    }
}

fn sweep_order(a: &EntitySpan, b: &EntitySpan) -> Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| a.entity_type.cmp(&b.entity_type))
        .then_with(|| b.kind.precedence().cmp(&a.kind.precedence()))
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| a.source.cmp(&b.source))
}

/// Collapse exact `(start, end, type)` duplicates, keeping first-seen order.
fn dedup_exact(spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
    let mut slot: HashMap<(usize, usize, EntityType), usize> = HashMap::new();
    let mut out: Vec<EntitySpan> = Vec::with_capacity(spans.len());

    for span in spans {
        let key = (span.start, span.end, span.entity_type);
        match slot.get(&key) {
            None => {
                slot.insert(key, out.len());
                out.push(span);
            }
            Some(&i) => {
                let max_score = out[i].score.max(span.score);
                if representative_beats(&span, &out[i]) {
                    out[i] = span;
                }
                out[i].score = max_score;
            }
        }
    }
    out
}

/// Higher precedence, then lower priority, then smaller source.
fn representative_beats(challenger: &EntitySpan, current: &EntitySpan) -> bool {
    challenger
        .kind
        .precedence()
        .cmp(&current.kind.precedence())
        .then_with(|| current.priority.cmp(&challenger.priority))
        .then_with(|| current.source.cmp(&challenger.source))
        == Ordering::Greater
}
