//! Approximate string similarity for the fuzzy pass.
//!
//! All scorers return a value in `[0.0, 100.0]`; the fuzzy pass compares it
//! against `threshold × 100` and reports `similarity / 100` as the score.
//!
//! | Scorer | Measure |
//! |--------|---------|
//! | [`PartialRatio`] | best [`Ratio`] of the shorter string against every equal-length window of the longer |
//! | [`Ratio`] | normalized Levenshtein similarity |
//! | [`JaroWinkler`] | Jaro-Winkler similarity |

use serde::{Deserialize, Serialize};

/// A similarity measure on normalized strings, in `[0, 100]`.
pub trait Similarity: Send + Sync {
    /// Similarity of `a` and `b`; 100 means identical.
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Normalized Levenshtein similarity over whole strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ratio;

impl Similarity for Ratio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b) * 100.0
    }
}

/// Best [`Ratio`] of the shorter string against equal-length windows of the longer.
///
/// # Examples
///
/// ```
/// use clinspan::similarity::{PartialRatio, Similarity};
///
/// let sim = PartialRatio.similarity("dor epigastric", "dor epigastrica");
/// assert!((sim - 100.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialRatio;

impl Similarity for PartialRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let a_chars: Vec<char> = a.chars().collect();
        let b_chars: Vec<char> = b.chars().collect();
        let (short, long) = if a_chars.len() <= b_chars.len() {
            (a_chars, b_chars)
        } else {
            (b_chars, a_chars)
        };

        if short.is_empty() {
            return if long.is_empty() { 100.0 } else { 0.0 };
        }

        let short: String = short.into_iter().collect();
        let mut best = 0.0f64;
        for window in long.windows(short.chars().count()) {
            let candidate: String = window.iter().collect();
            let sim = strsim::normalized_levenshtein(&short, &candidate);
            if sim > best {
                best = sim;
                if best >= 1.0 {
                    break;
                }
            }
        }
        best * 100.0
    }
}

/// Jaro-Winkler similarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl Similarity for JaroWinkler {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        strsim::jaro_winkler(a, b) * 100.0
    }
}

/// Serializable scorer choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scorer {
    /// [`PartialRatio`]
    #[default]
    PartialRatio,
    /// [`Ratio`]
    Ratio,
    /// [`JaroWinkler`]
    JaroWinkler,
}

impl Scorer {
    /// The scorer implementation.
    #[must_use]
    pub fn similarity_fn(&self) -> &'static dyn Similarity {
        match self {
            Scorer::PartialRatio => &PartialRatio,
            Scorer::Ratio => &Ratio,
            Scorer::JaroWinkler => &JaroWinkler,
        }
    }
}

impl Similarity for Scorer {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        self.similarity_fn().similarity(a, b)
    }
}
