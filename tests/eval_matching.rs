//! Evaluation scenarios: match modes, greedy pairing and corpus aggregation.

use clinspan::eval::{
    evaluate_corpus, evaluate_document, match_reason, AssertionLabel, Counts, EvalConfig,
    EvalDocument, EvalEntity, MatchMode, MatchReason, MissingDocumentPolicy,
};
use clinspan::{EntityType, Extractor, LexiconIndex, LexiconRecord, Sentence};

fn symptom(start: usize, end: usize) -> EvalEntity {
    EvalEntity::new(start, end, "", EntityType::Symptom)
}

#[test]
fn partial_boundary_depends_on_mode() {
    let gold = symptom(20, 36);
    let pred = symptom(20, 28);

    let lenient = EvalConfig::default()
        .with_mode(MatchMode::IouOrMinCovOrContainment)
        .with_threshold(0.5);
    assert_eq!(evaluate_document(&[gold.clone()], &[pred.clone()], &lenient).counts().tp, 1);

    let strict_iou = EvalConfig::default().with_mode(MatchMode::Iou).with_threshold(0.6);
    let counts = evaluate_document(&[gold.clone()], &[pred.clone()], &strict_iou).counts();
    assert_eq!(counts, Counts::new(0, 1, 1));

    assert_eq!(
        match_reason(&gold, &pred, MatchMode::Strict, 0.0),
        None
    );
}

#[test]
fn one_prediction_cannot_satisfy_two_golds() {
    let gold = vec![symptom(0, 10), symptom(0, 9)];
    let pred = vec![symptom(0, 10)];
    let eval = evaluate_document(&gold, &pred, &EvalConfig::default());
    let t = &eval.types[0];
    assert_eq!(t.result.pairs, vec![(0, 0)]);
    assert_eq!(t.result.unmatched_gold, vec![1]);
    assert_eq!(t.result.reasons, vec![MatchReason::Iou]);
}

#[test]
fn assertion_confusion_over_matched_pairs() {
    let gold = vec![
        symptom(0, 5).with_assertion(AssertionLabel::Negated),
        symptom(10, 15),
        symptom(20, 25).with_assertion(AssertionLabel::Historical),
    ];
    let pred = vec![
        symptom(0, 5).with_assertion(AssertionLabel::Negated),
        symptom(10, 15).with_assertion(AssertionLabel::Possible),
    ];
    let confusion = evaluate_document(&gold, &pred, &EvalConfig::default()).confusion();
    assert_eq!(confusion.total(), 2);
    assert_eq!(confusion.get(AssertionLabel::Negated, AssertionLabel::Negated), 1);
    assert_eq!(confusion.get(AssertionLabel::Present, AssertionLabel::Possible), 1);
    assert!((confusion.accuracy() - 0.5).abs() < 1e-12);
}

#[test]
fn extraction_output_evaluates_against_gold() {
    let index = LexiconIndex::build(vec![
        LexiconRecord::new("dor epigástrica", EntityType::Symptom, 1),
        LexiconRecord::new("náusea", EntityType::Symptom, 1),
        LexiconRecord::new("omeprazol", EntityType::Drug, 1),
    ]);
    let doc = "Refere dor epigástrica e náuseas. Em uso de omeprazol.";
    let sentences = vec![
        Sentence::from_document(doc, 0, 33).unwrap(),
        Sentence::from_document(doc, 34, 54).unwrap(),
    ];
    let extraction = Extractor::new(&index).extract_document(&sentences);
    let pred = EvalDocument::new(
        "case-1",
        extraction.entities.iter().map(EvalEntity::from).collect(),
    );
    let gold = EvalDocument::new(
        "case-1",
        vec![
            EvalEntity::new(7, 22, "dor epigástrica", EntityType::Symptom),
            EvalEntity::new(25, 32, "náuseas", EntityType::Symptom),
            EvalEntity::new(44, 53, "omeprazol", EntityType::Drug),
        ],
    );

    let report = evaluate_corpus(&[gold], &[pred], &EvalConfig::default()).unwrap();
    assert_eq!(report.per_type[&EntityType::Drug], Counts::new(1, 0, 0));
    // "náuseas" is not in the lexicon in plural form and symptoms never fuzzy match
    assert_eq!(report.per_type[&EntityType::Symptom], Counts::new(1, 0, 1));
    assert_eq!(report.micro, Counts::new(2, 0, 1));
}

#[test]
fn corpus_policies() {
    let gold = vec![
        EvalDocument::new("a", vec![symptom(0, 4)]),
        EvalDocument::new("b", vec![symptom(0, 4)]),
    ];
    let pred = vec![EvalDocument::new("a", vec![symptom(0, 4)])];

    let counted = evaluate_corpus(&gold, &pred, &EvalConfig::default()).unwrap();
    assert_eq!(counted.micro, Counts::new(1, 0, 1));
    assert_eq!(counted.missing_predictions, vec!["b".to_string()]);

    let skipped = evaluate_corpus(
        &gold,
        &pred,
        &EvalConfig::default().with_missing_documents(MissingDocumentPolicy::Skip),
    )
    .unwrap();
    assert_eq!(skipped.micro, Counts::new(1, 0, 0));
    assert!((skipped.micro.f1() - 1.0).abs() < 1e-12);

    let strict = EvalConfig::default().with_missing_documents(MissingDocumentPolicy::Error);
    assert!(evaluate_corpus(&gold, &pred, &strict).is_err());
}

#[test]
fn report_serializes_counts_with_fn_key() {
    let gold = vec![EvalDocument::new("a", vec![symptom(0, 4)])];
    let report = evaluate_corpus(&gold, &[], &EvalConfig::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["micro"]["fn"], 1);
    assert_eq!(json["per_type"]["SYMPTOM"]["tp"], 0);
}
