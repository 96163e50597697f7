//! Immutable inverted index over a clinical term dictionary.
//!
//! # Structure
//!
//! ```text
//! records (ordered) ──normalize──▶ entries[id]
//!                                    │
//!        ┌───────────────────────────┼────────────────────────────┐
//!        ▼                           ▼                            ▼
//!  single-token bucket        multi-token bucket           fuzzy blocks
//!  "febre" → id 3             "dor" → [0, 7]               "epi" → [0, 12]
//!                             "epigastrica" → [0]          "feb" → [3]
//! ```
//!
//! Built once, read-only afterwards, shared by reference across threads.
//! When two records normalize to the same term the first by load order is
//! indexed; later ones are reported through [`LexiconIndex::ambiguities`]
//! and never matched.

use crate::normalize::Normalizer;
use crate::types::{EntityType, EntryId};
use crate::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Characters of a token used as its fuzzy blocking key.
pub const BLOCKING_PREFIX_CHARS: usize = 3;

/// One dictionary row as supplied by the vocabulary loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconRecord {
    /// Surface term
    pub term: String,
    /// Entity type assigned to the term
    pub entity_type: EntityType,
    /// Lower is preferred
    #[serde(default)]
    pub priority: i32,
    /// Opaque payload passed through untouched
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl LexiconRecord {
    /// Create a record without metadata.
    #[must_use]
    pub fn new(term: impl Into<String>, entity_type: EntityType, priority: i32) -> Self {
        Self {
            term: term.into(),
            entity_type,
            priority,
            metadata: serde_json::Value::Null,
        }
    }

    /// Attach opaque metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// An indexed term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// Position in the index
    pub id: EntryId,
    /// Term as supplied
    pub original_term: String,
    /// Normalized term, never empty
    pub normalized_term: String,
    /// `normalized_term` split on the single space
    pub tokens: Vec<String>,
    /// Entity type
    pub entity_type: EntityType,
    /// Lower is preferred
    pub priority: i32,
    /// Opaque payload
    pub metadata: serde_json::Value,
    /// Position in the supplied record sequence
    pub load_index: usize,
}

impl LexiconEntry {
    /// Number of tokens in the normalized term.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// True for terms of two or more tokens.
    #[must_use]
    pub fn is_multi_token(&self) -> bool {
        self.tokens.len() > 1
    }

    /// Length of the normalized term in chars.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.normalized_term.chars().count()
    }
}

/// A record excluded because an earlier record normalized to the same term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ambiguity {
    /// Shared normalized term
    pub normalized_term: String,
    /// Entry that stays indexed
    pub kept: EntryId,
    /// Load index of the excluded record
    pub discarded_load_index: usize,
    /// Term of the excluded record, as supplied
    pub discarded_term: String,
    /// Type of the excluded record
    pub discarded_type: EntityType,
}

/// A record that could not be indexed at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecord {
    /// Load index of the record
    pub load_index: usize,
    /// Term as supplied
    pub term: String,
    /// Why it was rejected
    pub reason: String,
}

/// Summary counts for an index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Indexed entries
    pub entries: usize,
    /// Single-token entries
    pub single_token: usize,
    /// Multi-token entries
    pub multi_token: usize,
    /// Records excluded as ambiguous
    pub ambiguities: usize,
    /// Records rejected
    pub rejected: usize,
    /// Indexed entries per type
    pub per_type: BTreeMap<EntityType, usize>,
}

/// Inverted index from normalized terms and tokens to entries.
#[derive(Debug, Clone, Default)]
pub struct LexiconIndex {
    entries: Vec<LexiconEntry>,
    by_term: HashMap<String, EntryId>,
    single_by_token: HashMap<String, EntryId>,
    multi_by_token: HashMap<String, Vec<EntryId>>,
    multi_by_first_token: HashMap<String, Vec<EntryId>>,
    multi_ids: Vec<EntryId>,
    fuzzy_blocks: HashMap<String, Vec<EntryId>>,
    ambiguities: Vec<Ambiguity>,
    rejected: Vec<RejectedRecord>,
}

impl LexiconIndex {
    /// Build the index from an ordered record sequence.
    ///
    /// Never fails: duplicates and empty terms become diagnostics.
    ///
    /// # Example
    ///
    /// ```rust
    /// use clinspan::{EntityType, LexiconIndex, LexiconRecord};
    ///
    /// let index = LexiconIndex::build(vec![
    ///     LexiconRecord::new("febre", EntityType::Symptom, 1),
    ///     LexiconRecord::new("Febre", EntityType::Problem, 1),
    /// ]);
    /// assert_eq!(index.len(), 1);
    /// assert_eq!(index.ambiguities().len(), 1);
    /// ```
    #[must_use]
    pub fn build(records: impl IntoIterator<Item = LexiconRecord>) -> Self {
        let normalizer = Normalizer::new();
        let mut index = Self::default();

        for (load_index, record) in records.into_iter().enumerate() {
            let normalized_term = normalizer.normalize_str(&record.term);
            if normalized_term.is_empty() {
                debug!(
                    "lexicon: rejecting record {} ({:?}): empty after normalization",
                    load_index, record.term
                );
                index.rejected.push(RejectedRecord {
                    load_index,
                    term: record.term,
                    reason: "term is empty after normalization".to_string(),
                });
                continue;
            }

            if let Some(&kept) = index.by_term.get(&normalized_term) {
                index.ambiguities.push(Ambiguity {
                    normalized_term,
                    kept,
                    discarded_load_index: load_index,
                    discarded_term: record.term,
                    discarded_type: record.entity_type,
                });
                continue;
            }

            let id = index.entries.len();
            let tokens: Vec<String> = normalized_term.split(' ').map(str::to_string).collect();

            if tokens.len() == 1 {
                index.single_by_token.insert(tokens[0].clone(), id);
            } else {
                index.multi_ids.push(id);
                index
                    .multi_by_first_token
                    .entry(tokens[0].clone())
                    .or_default()
                    .push(id);
                for token in &tokens {
                    let ids = index.multi_by_token.entry(token.clone()).or_default();
                    if ids.last() != Some(&id) {
                        ids.push(id);
                    }
                }
            }

            for token in &tokens {
                let ids = index
                    .fuzzy_blocks
                    .entry(blocking_key(token).to_string())
                    .or_default();
                if ids.last() != Some(&id) {
                    ids.push(id);
                }
            }

            index.by_term.insert(normalized_term.clone(), id);
            index.entries.push(LexiconEntry {
                id,
                original_term: record.term,
                normalized_term,
                tokens,
                entity_type: record.entity_type,
                priority: record.priority,
                metadata: record.metadata,
                load_index,
            });
        }

        if !index.ambiguities.is_empty() {
            warn!(
                "lexicon: {} record(s) share a normalized term with an earlier record and were excluded",
                index.ambiguities.len()
            );
        }
        if !index.rejected.is_empty() {
            warn!(
                "lexicon: {} record(s) rejected (empty after normalization)",
                index.rejected.len()
            );
        }
        debug!(
            "lexicon: indexed {} entries ({} single-token, {} multi-token)",
            index.entries.len(),
            index.single_by_token.len(),
            index.multi_ids.len()
        );

        index
    }

    /// Entry by id.
    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<&LexiconEntry> {
        self.entries.get(id)
    }

    /// All indexed entries, in id order.
    #[must_use]
    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    /// Number of indexed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Single-token entry whose term equals `token`.
    #[must_use]
    pub fn single_token_entry(&self, token: &str) -> Option<&LexiconEntry> {
        self.single_by_token
            .get(token)
            .and_then(|&id| self.entries.get(id))
    }

    /// Ids of multi-token entries containing `token`, in id order.
    #[must_use]
    pub fn multi_token_entries_with(&self, token: &str) -> &[EntryId] {
        self.multi_by_token.get(token).map_or(&[], Vec::as_slice)
    }

    /// Ids of multi-token entries whose first token is `token`, in id order.
    #[must_use]
    pub fn multi_token_entries_starting_with(&self, token: &str) -> &[EntryId] {
        self.multi_by_first_token
            .get(token)
            .map_or(&[], Vec::as_slice)
    }

    /// All multi-token entries, in id order.
    pub fn multi_token_entries(&self) -> impl Iterator<Item = &LexiconEntry> {
        self.multi_ids.iter().filter_map(|&id| self.entries.get(id))
    }

    /// Entry whose normalized term equals `normalized_term`.
    #[must_use]
    pub fn lookup(&self, normalized_term: &str) -> Option<&LexiconEntry> {
        self.by_term
            .get(normalized_term)
            .and_then(|&id| self.entries.get(id))
    }

    /// Ids of entries with a token sharing `token`'s blocking key, in id order.
    #[must_use]
    pub fn fuzzy_block(&self, token: &str) -> &[EntryId] {
        self.fuzzy_blocks
            .get(blocking_key(token))
            .map_or(&[], Vec::as_slice)
    }

    /// Records excluded because an earlier record had the same normalized term.
    #[must_use]
    pub fn ambiguities(&self) -> &[Ambiguity] {
        &self.ambiguities
    }

    /// Records that could not be indexed.
    #[must_use]
    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    /// Summary counts.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        let mut per_type = BTreeMap::new();
        for entry in &self.entries {
            *per_type.entry(entry.entity_type).or_insert(0) += 1;
        }
        IndexStats {
            entries: self.entries.len(),
            single_token: self.single_by_token.len(),
            multi_token: self.multi_ids.len(),
            ambiguities: self.ambiguities.len(),
            rejected: self.rejected.len(),
            per_type,
        }
    }
}

/// Blocking key of a normalized token: its first [`BLOCKING_PREFIX_CHARS`] chars.
#[must_use]
pub fn blocking_key(token: &str) -> &str {
    match token.char_indices().nth(BLOCKING_PREFIX_CHARS) {
        Some((byte, _)) => &token[..byte],
        None => token,
    }
}

/// Read a JSON array of [`LexiconRecord`]s.
pub fn load_records_json(path: impl AsRef<Path>) -> Result<Vec<LexiconRecord>> {
    let file = std::fs::File::open(path.as_ref())?;
    let records: Vec<LexiconRecord> = serde_json::from_reader(std::io::BufReader::new(file))?;
    Ok(records)
}
