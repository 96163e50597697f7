//! # clinspan
//!
//! Deterministic clinical entity span matching for Portuguese free text.
//!
//! - **Extraction**: lexicon and regex evidence, mapped back to exact
//!   character offsets in the original text
//! - **Resolution**: overlapping same-type spans reduced to one winner
//! - **Evaluation**: span-level P/R/F1 with IoU, coverage and containment modes
//!
//! ## Quick Start
//!
//! ```rust
//! use clinspan::{EntityType, Extractor, LexiconIndex, LexiconRecord, Sentence};
//!
//! let index = LexiconIndex::build(vec![
//!     LexiconRecord::new("dor epigástrica", EntityType::Symptom, 1),
//!     LexiconRecord::new("dor", EntityType::Symptom, 2),
//!     LexiconRecord::new("insuficiência cardíaca", EntityType::Problem, 1),
//! ]);
//!
//! let extractor = Extractor::new(&index);
//! let text = "Paciente refere DOR EPIGASTRICA, sem insuficiencia cardiaca.";
//! let out = extractor.extract_sentence(&Sentence::new(text, 0), 0);
//!
//! let surfaces: Vec<_> = out.entities.iter().map(|e| e.surface_text.as_str()).collect();
//! assert_eq!(surfaces, vec!["DOR EPIGASTRICA", "insuficiencia cardiaca"]);
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Type | Output |
//! |-------|------|--------|
//! | Normalize | [`Normalizer`] | lowercase, accent-free text + alignment |
//! | Index | [`LexiconIndex`] | frozen lookup structures, built once |
//! | Generate | [`CandidateGenerator`] | pattern, phrase, token and fuzzy candidates |
//! | Map | [`SpanMapper`] | original-text char offsets |
//! | Resolve | [`OverlapResolver`] | conflict-free spans per sentence |
//! | Evaluate | [`eval`] | TP/FP/FN, assertion confusion |
//!
//! All public offsets are **character** offsets into the original text,
//! half-open `[start, end)`.
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! clinspan = "0.1"                                       # library only
//! clinspan = { version = "0.1", features = ["parallel"] } # + rayon document fan-out
//! clinspan = { version = "0.1", features = ["cli"] }      # + `clinspan` binary
//! ```

#![warn(missing_docs)]

pub mod candidates;
pub mod config;
mod error;
pub mod eval;
pub mod extract;
pub mod lexicon;
pub mod mapper;
pub mod normalize;
pub mod offset;
pub mod postprocess;
pub mod resolve;
pub mod similarity;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use clinspan::prelude::*;
    //!
    //! let index = LexiconIndex::build(vec![LexiconRecord::new("febre", EntityType::Symptom, 1)]);
    //! let out = Extractor::new(&index).extract_sentence(&Sentence::new("Nega febre.", 0), 0);
    //! for e in out.entities.of_type(EntityType::Symptom) {
    //!     println!("{}: {}", e.entity_type, e.surface_text);
    //! }
    //! ```

    pub use crate::config::{ExtractorConfig, FuzzyConfig, PassSet};
    pub use crate::error::{Error, Result};
    pub use crate::eval::{
        evaluate_corpus, evaluate_document, EvalConfig, EvalDocument, EvalEntity, MatchMode,
    };
    pub use crate::extract::{Extraction, Extractor, Sentence};
    pub use crate::lexicon::{LexiconIndex, LexiconRecord};
    pub use crate::types::{EntitySpan, EntitySpanSliceExt, EntityType, MatchKind};
}

// Re-exports
pub use candidates::{CandidateGenerator, SentenceInput};
pub use config::{ExtractorConfig, FuzzyConfig, PassSet};
pub use error::{Error, Result};
pub use extract::{Diagnostics, Extraction, Extractor, Sentence};
pub use lexicon::{Ambiguity, IndexStats, LexiconEntry, LexiconIndex, LexiconRecord};
pub use mapper::{DroppedCandidate, MapError, SpanMapper};
pub use normalize::{Normalized, Normalizer, Token};
pub use offset::{CharIndex, Span};
pub use postprocess::{EntityFilter, FilterConfig};
pub use resolve::OverlapResolver;
pub use similarity::{Scorer, Similarity};
pub use types::{
    Coordinates, EntitySpan, EntitySpanSliceExt, EntityType, EntryId, MatchCandidate, MatchKind,
    MatchSource, PatternId,
};
