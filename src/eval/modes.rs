//! Span matching rules.
//!
//! # The Core Problem
//!
//! Reference annotators and the extractor rarely agree on exact boundaries:
//!
//! ```text
//! Text:   "Paciente com dor epigástrica intensa"
//!
//! Gold:             [==dor epigástrica==)         [13, 28)
//! Pred:             [=dor=)                       [13, 16)
//!
//! overlap = 3   iou = 3/15 = 0.2   min_cov = 3/3 = 1.0   containment = yes
//! ```
//!
//! Whether this is a hit depends on the mode:
//!
//! | Mode | Rule (type must always agree) |
//! |------|-------------------------------|
//! | `Strict` | identical boundaries |
//! | `Iou` | `iou ≥ θ` |
//! | `IouOrMinCov` | `iou ≥ θ` or `min_cov ≥ θ` |
//! | `IouOrContainment` | `iou ≥ θ` or one span encloses the other |
//! | `IouOrMinCovOrContainment` | any of the three |
//!
//! Under the lenient modes the example above matches; under `Iou` with
//! θ = 0.5 it does not.

use super::EvalEntity;
use serde::{Deserialize, Serialize};

/// Matching rule for a gold/pred pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Identical boundaries
    Strict,
    /// IoU at or above the threshold
    #[default]
    Iou,
    /// IoU or min coverage at or above the threshold
    IouOrMinCov,
    /// IoU at or above the threshold, or containment
    IouOrContainment,
    /// IoU or min coverage at or above the threshold, or containment
    IouOrMinCovOrContainment,
}

impl MatchMode {
    /// All available modes.
    pub fn all() -> &'static [MatchMode] {
        &[
            MatchMode::Strict,
            MatchMode::Iou,
            MatchMode::IouOrMinCov,
            MatchMode::IouOrContainment,
            MatchMode::IouOrMinCovOrContainment,
        ]
    }

    /// Short name, as used in configuration files.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            MatchMode::Strict => "strict",
            MatchMode::Iou => "iou",
            MatchMode::IouOrMinCov => "iou_or_min_cov",
            MatchMode::IouOrContainment => "iou_or_containment",
            MatchMode::IouOrMinCovOrContainment => "iou_or_min_cov_or_containment",
        }
    }

    fn uses_min_cov(&self) -> bool {
        matches!(self, MatchMode::IouOrMinCov | MatchMode::IouOrMinCovOrContainment)
    }

    fn uses_containment(&self) -> bool {
        matches!(
            self,
            MatchMode::IouOrContainment | MatchMode::IouOrMinCovOrContainment
        )
    }
}

impl std::str::FromStr for MatchMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        MatchMode::all()
            .iter()
            .copied()
            .find(|m| m.name() == s.trim().to_lowercase())
            .ok_or_else(|| crate::Error::parse(format!("unknown match mode '{s}'")))
    }
}

/// Which rule made a pair match. Checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    /// Identical boundaries (strict mode)
    Exact,
    /// IoU at or above the threshold
    Iou,
    /// Min coverage at or above the threshold
    MinCov,
    /// One span encloses the other
    Containment,
}

/// Why `gold` and `pred` match under `mode` and `threshold`, if they do.
#[must_use]
pub fn match_reason(
    gold: &EvalEntity,
    pred: &EvalEntity,
    mode: MatchMode,
    threshold: f64,
) -> Option<MatchReason> {
    if gold.entity_type != pred.entity_type {
        return None;
    }
    let (g, p) = (gold.span(), pred.span());

    if mode == MatchMode::Strict {
        return (g == p).then_some(MatchReason::Exact);
    }
    if g.overlap(&p) == 0 {
        return None;
    }
    if g.iou(&p) >= threshold {
        return Some(MatchReason::Iou);
    }
    if mode.uses_min_cov() && g.min_coverage(&p) >= threshold {
        return Some(MatchReason::MinCov);
    }
    if mode.uses_containment() && g.contains_or_within(&p) {
        return Some(MatchReason::Containment);
    }
    None
}

/// True if `gold` and `pred` match under `mode` and `threshold`.
#[must_use]
pub fn is_match(gold: &EvalEntity, pred: &EvalEntity, mode: MatchMode, threshold: f64) -> bool {
    match_reason(gold, pred, mode, threshold).is_some()
}

/// Pairing strength: IoU, or 1.0 for exact and containment-only matches.
pub(crate) fn strength(gold: &EvalEntity, pred: &EvalEntity, reason: MatchReason) -> f64 {
    match reason {
        MatchReason::Exact | MatchReason::Containment => 1.0,
        MatchReason::Iou | MatchReason::MinCov => gold.span().iou(&pred.span()),
    }
}
