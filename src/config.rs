//! Extraction configuration.
//!
//! Every struct is `Default`, serde (de)serializable with `#[serde(default)]`
//! so partial JSON files work, and has builder-style `with_*` setters.
//!
//! ```json
//! {
//!   "passes": { "fuzzy": false },
//!   "fuzzy": { "threshold": 0.92, "excluded_types": ["SYMPTOM", "DRUG"] },
//!   "filter": { "min_chars": 3 }
//! }
//! ```

use crate::postprocess::FilterConfig;
use crate::similarity::Scorer;
use crate::types::EntityType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which candidate passes run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassSet {
    /// Fixed shape patterns
    pub pattern: bool,
    /// Multi-token exact phrases
    pub exact_phrase: bool,
    /// Whole-token coverage
    pub token: bool,
    /// Approximate fallback
    pub fuzzy: bool,
}

impl Default for PassSet {
    fn default() -> Self {
        Self::all()
    }
}

impl PassSet {
    /// Every pass enabled.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            pattern: true,
            exact_phrase: true,
            token: true,
            fuzzy: true,
        }
    }

    /// Lexicon passes only, no fuzzy fallback.
    #[must_use]
    pub const fn exact_only() -> Self {
        Self {
            pattern: true,
            exact_phrase: true,
            token: true,
            fuzzy: false,
        }
    }
}

/// Fuzzy pass tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    /// Minimum similarity in [0, 1]; compared against `similarity / 100`
    pub threshold: f64,
    /// Types never matched approximately
    pub excluded_types: Vec<EntityType>,
    /// Largest window considered, in tokens
    pub max_window_tokens: usize,
    /// Windows shorter than `ratio × term` or longer than `term / ratio` are skipped
    pub min_length_ratio: f64,
    /// Similarity measure
    pub scorer: Scorer,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            threshold: 0.90,
            excluded_types: vec![EntityType::Symptom],
            max_window_tokens: 6,
            min_length_ratio: 0.8,
            scorer: Scorer::PartialRatio,
        }
    }
}

impl FuzzyConfig {
    /// Set the similarity threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the excluded types.
    #[must_use]
    pub fn with_excluded_types(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.excluded_types = types.into_iter().collect();
        self
    }

    /// Set the window cap.
    #[must_use]
    pub fn with_max_window_tokens(mut self, max: usize) -> Self {
        self.max_window_tokens = max;
        self
    }

    /// Set the length ratio bound.
    #[must_use]
    pub fn with_min_length_ratio(mut self, ratio: f64) -> Self {
        self.min_length_ratio = ratio;
        self
    }

    /// Set the scorer.
    #[must_use]
    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Check if `ty` is matched approximately.
    #[must_use]
    pub fn allows(&self, ty: EntityType) -> bool {
        !self.excluded_types.contains(&ty)
    }
}

/// Configuration for [`crate::Extractor`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Enabled passes
    pub passes: PassSet,
    /// Fuzzy pass tuning
    pub fuzzy: FuzzyConfig,
    /// Junk-span filter; `None` disables it
    pub filter: Option<FilterConfig>,
}

impl ExtractorConfig {
    /// Set the enabled passes.
    #[must_use]
    pub fn with_passes(mut self, passes: PassSet) -> Self {
        self.passes = passes;
        self
    }

    /// Set the fuzzy tuning.
    #[must_use]
    pub fn with_fuzzy(mut self, fuzzy: FuzzyConfig) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    /// Enable the junk-span filter.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Load from a JSON file and validate.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let fuzzy = &self.fuzzy;
        if !(0.0..=1.0).contains(&fuzzy.threshold) {
            return Err(Error::config(format!(
                "fuzzy.threshold must be in [0, 1], got {}",
                fuzzy.threshold
            )));
        }
        if !(fuzzy.min_length_ratio > 0.0 && fuzzy.min_length_ratio <= 1.0) {
            return Err(Error::config(format!(
                "fuzzy.min_length_ratio must be in (0, 1], got {}",
                fuzzy.min_length_ratio
            )));
        }
        if fuzzy.max_window_tokens == 0 {
            return Err(Error::config("fuzzy.max_window_tokens must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.passes, PassSet::all());
        assert!((config.fuzzy.threshold - 0.90).abs() < 1e-12);
        assert!(!config.fuzzy.allows(EntityType::Symptom));
        assert!(config.fuzzy.allows(EntityType::Problem));
        assert!(config.filter.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config: ExtractorConfig =
            serde_json::from_str(r#"{"passes": {"fuzzy": false}, "fuzzy": {"threshold": 0.85}}"#)
                .unwrap();
        assert!(!config.passes.fuzzy);
        assert!(config.passes.exact_phrase);
        assert!((config.fuzzy.threshold - 0.85).abs() < 1e-12);
        assert_eq!(config.fuzzy.excluded_types, vec![EntityType::Symptom]);
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let config = ExtractorConfig::default().with_fuzzy(FuzzyConfig::default().with_threshold(1.5));
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config =
            ExtractorConfig::default().with_fuzzy(FuzzyConfig::default().with_min_length_ratio(0.0));
        assert!(config.validate().is_err());
    }
}
