//! Extension traits for entity span collections.

use super::{EntitySpan, EntityType};
use std::collections::BTreeMap;

/// Extension methods for slices of finalized spans.
///
/// # Example
///
/// ```rust
/// use clinspan::types::{EntitySpan, EntitySpanSliceExt, EntityType, MatchKind, MatchSource};
///
/// let span = |start, end, ty| EntitySpan {
///     start,
///     end,
///     surface_text: String::new(),
///     entity_type: ty,
///     score: 0.99,
///     kind: MatchKind::Token,
///     evidence_sentence: String::new(),
///     sentence_id: 0,
///     source: MatchSource::Entry(0),
///     priority: 0,
/// };
/// let spans = vec![span(0, 5, EntityType::Symptom), span(10, 18, EntityType::Anatomy)];
///
/// assert_eq!(spans.of_type(EntityType::Anatomy).count(), 1);
/// assert!(spans.same_type_conflicts(0.5).is_empty());
/// ```
pub trait EntitySpanSliceExt {
    /// Filter spans by type.
    fn of_type(&self, ty: EntityType) -> impl Iterator<Item = &EntitySpan>;

    /// Pairs of same-type spans in the same sentence whose overlap ratio exceeds `max_ratio`.
    fn same_type_conflicts(&self, max_ratio: f64) -> Vec<(&EntitySpan, &EntitySpan)>;

    /// Spans sorted by `(start, length desc)`.
    fn sorted_by_position(&self) -> Vec<&EntitySpan>;

    /// Group spans by type, in canonical type order.
    fn group_by_type(&self) -> BTreeMap<EntityType, Vec<&EntitySpan>>;
}

impl EntitySpanSliceExt for [EntitySpan] {
    fn of_type(&self, ty: EntityType) -> impl Iterator<Item = &EntitySpan> {
        self.iter().filter(move |s| s.entity_type == ty)
    }

    fn same_type_conflicts(&self, max_ratio: f64) -> Vec<(&EntitySpan, &EntitySpan)> {
        let mut pairs = Vec::new();
        for (i, a) in self.iter().enumerate() {
            for b in &self[i + 1..] {
                if a.entity_type == b.entity_type
                    && a.sentence_id == b.sentence_id
                    && a.span().min_coverage(&b.span()) > max_ratio
                {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }

    fn sorted_by_position(&self) -> Vec<&EntitySpan> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.len().cmp(&a.len())));
        sorted
    }

    fn group_by_type(&self) -> BTreeMap<EntityType, Vec<&EntitySpan>> {
        let mut groups: BTreeMap<EntityType, Vec<&EntitySpan>> = BTreeMap::new();
        for span in self {
            groups.entry(span.entity_type).or_default().push(span);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchKind, MatchSource};

    fn span(start: usize, end: usize, ty: EntityType, sentence_id: usize) -> EntitySpan {
        EntitySpan {
            start,
            end,
            surface_text: String::new(),
            entity_type: ty,
            score: 0.9,
            kind: MatchKind::Token,
            evidence_sentence: String::new(),
            sentence_id,
            source: MatchSource::Entry(0),
            priority: 0,
        }
    }

    #[test]
    fn test_conflicts_respect_type_and_sentence() {
        let spans = vec![
            span(0, 10, EntityType::Symptom, 0),
            span(2, 10, EntityType::Symptom, 0),
            span(2, 10, EntityType::Anatomy, 0),
            span(2, 10, EntityType::Symptom, 1),
        ];
        let conflicts = spans.same_type_conflicts(0.5);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].1.start, 2);
    }

    #[test]
    fn test_sorted_and_grouped() {
        let spans = vec![
            span(5, 8, EntityType::Drug, 0),
            span(0, 3, EntityType::Symptom, 0),
            span(0, 6, EntityType::Problem, 0),
        ];
        let sorted = spans.sorted_by_position();
        assert_eq!((sorted[0].start, sorted[0].end), (0, 6));
        assert_eq!(sorted[2].start, 5);

        let groups = spans.group_by_type();
        assert_eq!(groups.keys().next(), Some(&EntityType::Symptom));
        assert_eq!(groups.len(), 3);
    }
}
