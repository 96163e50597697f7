//! Core data types shared by extraction and evaluation.
//!
//! # Lifecycle
//!
//! ```text
//! LexiconRecord ──build──▶ LexiconEntry (frozen, in LexiconIndex)
//!                               │
//!                               ▼ one sentence call
//!                        MatchCandidate (normalized or original coords)
//!                               │ SpanMapper
//!                               ▼
//!                        EntitySpan (document char offsets, conflict-free
//!                                    after OverlapResolver)
//! ```
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`EntityType`] | Closed clinical label set |
//! | [`MatchKind`] | Which pass proposed a span, with a precedence rank |
//! | [`MatchSource`] | Back-reference to the lexicon entry or pattern |
//! | [`MatchCandidate`] | Unresolved proposal from one pass |
//! | [`EntitySpan`] | Finalized annotation |

mod candidate;
mod ext;
mod label;

pub use candidate::{
    Coordinates, EntitySpan, EntryId, MatchCandidate, MatchKind, MatchSource, PatternId,
};
pub use ext::EntitySpanSliceExt;
pub use label::EntityType;

/// Static assertions for types used in hot loops.
#[doc(hidden)]
pub mod static_checks {
    use super::*;

    // Closed enums stay one byte
    const _: () = assert!(std::mem::size_of::<EntityType>() == 1);
    const _: () = assert!(std::mem::size_of::<MatchKind>() == 1);

    // Candidates are created per window in the fuzzy pass
    const _: () = assert!(std::mem::size_of::<MatchCandidate>() <= 64);
}
