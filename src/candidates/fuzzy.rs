//! Fuzzy fallback pass.
//!
//! ```text
//! sentence tokens:   paciente  com  pneumonya  grave
//!                                   ▲ anchor (blocking key "pne")
//! blocked entry:     "pneumonia" (1 token)
//! windows tried:     [pneumonya] [pneumonya grave]
//! best window:       "pneumonya" → 88.9 < 90 → no candidate
//! ```
//!
//! Entries come from the blocking index only. Windows are the entry's token
//! count ± 1, capped, length-ratio gated, and skipped when the earlier passes
//! already cover every token in them.

use super::SentenceInput;
use crate::config::FuzzyConfig;
use crate::lexicon::{blocking_key, LexiconEntry, LexiconIndex};
use crate::normalize::Token;
use crate::offset::{CharIndex, Span};
use crate::similarity::Similarity;
use crate::types::{Coordinates, EntryId, MatchCandidate, MatchKind, MatchSource};
use std::collections::HashSet;

/// Run the fuzzy pass.
///
/// `covered[i]` marks normalized char `i` as covered by an earlier pass;
/// `matched` holds entries already matched exactly in this sentence.
pub(crate) fn fuzzy_candidates(
    sentence: &SentenceInput<'_>,
    tokens: &[Token<'_>],
    index: &LexiconIndex,
    config: &FuzzyConfig,
    covered: &[bool],
    matched: &HashSet<EntryId>,
) -> Vec<MatchCandidate> {
    let scorer = config.scorer.similarity_fn();
    let chars = CharIndex::new(&sentence.normalized.text);
    let min_sim = config.threshold * 100.0;
    let mut seen: HashSet<(EntryId, usize)> = HashSet::new();
    let mut out = Vec::new();

    for (j, token) in tokens.iter().enumerate() {
        let key = blocking_key(token.text);
        for &id in index.fuzzy_block(token.text) {
            let Some(entry) = index.entry(id) else {
                continue;
            };
            if !config.allows(entry.entity_type) || matched.contains(&id) {
                continue;
            }
            for (k, entry_token) in entry.tokens.iter().enumerate() {
                if k > j || blocking_key(entry_token) != key {
                    continue;
                }
                let anchor = j - k;
                if !seen.insert((id, anchor)) {
                    continue;
                }
                if let Some((start, end, sim)) = best_window(
                    sentence, tokens, anchor, entry, config, covered, &chars, scorer,
                ) {
                    if sim >= min_sim {
                        out.push(MatchCandidate {
                            start,
                            end,
                            coordinates: Coordinates::Normalized,
                            entity_type: entry.entity_type,
                            score: (sim / 100.0).clamp(0.0, 1.0),
                            kind: MatchKind::Fuzzy,
                            sentence_id: sentence.id,
                            source: MatchSource::Entry(id),
                            priority: entry.priority,
                        });
                    }
                }
            }
        }
    }
    out
}

/// Best-scoring window starting at token `anchor`, as normalized char bounds.
#[allow(clippy::too_many_arguments)]
fn best_window(
    sentence: &SentenceInput<'_>,
    tokens: &[Token<'_>],
    anchor: usize,
    entry: &LexiconEntry,
    config: &FuzzyConfig,
    covered: &[bool],
    chars: &CharIndex,
    scorer: &dyn Similarity,
) -> Option<(usize, usize, f64)> {
    let n = entry.token_count();
    let term_len = entry.char_len() as f64;
    let ratio = config.min_length_ratio;
    let mut best: Option<(usize, usize, f64)> = None;

    // Exact size first so it wins ties
    for size in [Some(n), n.checked_sub(1), Some(n + 1)].into_iter().flatten() {
        if size == 0 || size > config.max_window_tokens || anchor + size > tokens.len() {
            continue;
        }
        let window = &tokens[anchor..anchor + size];
        if window
            .iter()
            .all(|t| covered[t.start..t.end].iter().all(|&c| c))
        {
            continue;
        }
        let start = window[0].start;
        let end = window[size - 1].end;
        let len_ratio = (end - start) as f64 / term_len;
        if len_ratio < ratio || len_ratio > 1.0 / ratio {
            continue;
        }
        let text = chars.slice(&sentence.normalized.text, Span::new(start, end));
        let sim = scorer.similarity(text, &entry.normalized_term);
        if best.map_or(true, |(_, _, b)| sim > b) {
            best = Some((start, end, sim));
        }
    }
    best
}
