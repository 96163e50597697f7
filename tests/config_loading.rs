//! Configuration files for extraction and evaluation.

use clinspan::eval::{EvalConfig, MatchMode, MissingDocumentPolicy};
use clinspan::similarity::Scorer;
use clinspan::{EntityType, ExtractorConfig};
use std::io::Write;

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn partial_extractor_config_fills_defaults() {
    let file = write_temp(
        r#"{
            "passes": { "fuzzy": false },
            "fuzzy": { "threshold": 0.92, "excluded_types": ["SYMPTOM", "DRUG"], "scorer": "jaro_winkler" },
            "filter": { "min_chars": 3 }
        }"#,
    );
    let config = ExtractorConfig::from_json_file(file.path()).unwrap();
    assert!(!config.passes.fuzzy);
    assert!(config.passes.exact_phrase);
    assert!((config.fuzzy.threshold - 0.92).abs() < 1e-12);
    assert_eq!(
        config.fuzzy.excluded_types,
        vec![EntityType::Symptom, EntityType::Drug]
    );
    assert_eq!(config.fuzzy.scorer, Scorer::JaroWinkler);
    assert_eq!(config.fuzzy.max_window_tokens, 6);
    let filter = config.filter.unwrap();
    assert_eq!(filter.min_chars, 3);
    assert!(filter.trim_punct);
}

#[test]
fn empty_object_is_default() {
    let file = write_temp("{}");
    let config = ExtractorConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config, ExtractorConfig::default());
    assert!(config.filter.is_none());
}

#[test]
fn out_of_range_values_rejected() {
    for bad in [
        r#"{"fuzzy": {"threshold": 1.5}}"#,
        r#"{"fuzzy": {"min_length_ratio": 0.0}}"#,
        r#"{"fuzzy": {"max_window_tokens": 0}}"#,
    ] {
        let file = write_temp(bad);
        let err = ExtractorConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, clinspan::Error::Config(_)), "{bad}: {err}");
    }
}

#[test]
fn malformed_json_is_json_error() {
    let file = write_temp("{ not json");
    let err = ExtractorConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, clinspan::Error::Json(_)));
}

#[test]
fn eval_config_file() {
    let file = write_temp(r#"{"mode": "iou_or_min_cov_or_containment", "threshold": 0.3, "missing_documents": "error"}"#);
    let config = EvalConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.mode, MatchMode::IouOrMinCovOrContainment);
    assert!((config.threshold - 0.3).abs() < 1e-12);
    assert_eq!(config.missing_documents, MissingDocumentPolicy::Error);

    let bad = write_temp(r#"{"threshold": -1}"#);
    assert!(matches!(
        EvalConfig::from_json_file(bad.path()),
        Err(clinspan::Error::Config(_))
    ));
}
