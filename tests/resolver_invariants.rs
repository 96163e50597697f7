//! Property tests for overlap resolution.

use clinspan::resolve::MAX_OVERLAP_RATIO;
use clinspan::{EntitySpan, EntitySpanSliceExt, EntityType, MatchKind, MatchSource, OverlapResolver};
use proptest::prelude::*;

const TYPES: [EntityType; 3] = [EntityType::Symptom, EntityType::Problem, EntityType::Anatomy];
const KINDS: [MatchKind; 4] = [
    MatchKind::Pattern,
    MatchKind::ExactPhrase,
    MatchKind::Token,
    MatchKind::Fuzzy,
];

fn arb_span() -> impl Strategy<Value = EntitySpan> {
    (0usize..40, 1usize..15, 0usize..3, 0usize..4, 90u32..=100, 0usize..20, 0i32..4).prop_map(
        |(start, len, ty, kind, score, source, priority)| EntitySpan {
            start,
            end: start + len,
            surface_text: String::new(),
            entity_type: TYPES[ty],
            score: f64::from(score) / 100.0,
            kind: KINDS[kind],
            evidence_sentence: String::new(),
            sentence_id: 0,
            source: MatchSource::Entry(source),
            priority,
        },
    )
}

proptest! {
    #[test]
    fn no_same_type_conflicts_survive(spans in prop::collection::vec(arb_span(), 0..30)) {
        let resolved = OverlapResolver::new().resolve(spans);
        let conflicts = resolved.same_type_conflicts(MAX_OVERLAP_RATIO);
        prop_assert!(conflicts.is_empty(), "conflicts: {:?}", conflicts);
    }

    #[test]
    fn resolution_is_idempotent(spans in prop::collection::vec(arb_span(), 0..30)) {
        let resolver = OverlapResolver::new();
        let once = resolver.resolve(spans);
        let twice = resolver.resolve(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn output_is_drawn_from_input_bounds(spans in prop::collection::vec(arb_span(), 0..30)) {
        let bounds: Vec<_> = spans.iter().map(|s| (s.start, s.end, s.entity_type)).collect();
        let resolved = OverlapResolver::new().resolve(spans);
        for s in &resolved {
            prop_assert!(bounds.contains(&(s.start, s.end, s.entity_type)));
        }
        prop_assert!(resolved.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[test]
    fn exact_duplicates_collapse(span in arb_span(), kinds in prop::collection::vec(0usize..4, 1..5)) {
        let copies: Vec<EntitySpan> = kinds
            .iter()
            .map(|&k| EntitySpan { kind: KINDS[k], ..span.clone() })
            .collect();
        let best = kinds.iter().map(|&k| KINDS[k].precedence()).max().unwrap_or(0);
        let resolved = OverlapResolver::new().resolve(copies);
        prop_assert_eq!(resolved.len(), 1);
        prop_assert_eq!(resolved[0].kind.precedence(), best);
    }
}

#[test]
fn exact_phrase_outranks_token_and_fuzzy_on_same_span() {
    let base = EntitySpan {
        start: 4,
        end: 19,
        surface_text: "dor epigástrica".to_string(),
        entity_type: EntityType::Symptom,
        score: 0.95,
        kind: MatchKind::Token,
        evidence_sentence: String::new(),
        sentence_id: 0,
        source: MatchSource::Entry(0),
        priority: 1,
    };
    let resolved = OverlapResolver::new().resolve(vec![
        EntitySpan { kind: MatchKind::Fuzzy, score: 0.97, ..base.clone() },
        base.clone(),
        EntitySpan { kind: MatchKind::ExactPhrase, score: 0.99, ..base },
    ]);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].kind, MatchKind::ExactPhrase);
    assert!((resolved[0].score - 0.99).abs() < 1e-12);
}
