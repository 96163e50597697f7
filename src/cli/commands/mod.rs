//! Command implementations for the clinspan CLI
//!
//! Each command has its own module/file.

pub mod eval;
pub mod extract;
pub mod lexicon;

pub use eval::EvalArgs;
pub use extract::ExtractArgs;
pub use lexicon::LexiconArgs;

use crate::lexicon::{load_records_json, LexiconIndex};

/// Load and index a lexicon JSON file.
pub(crate) fn load_index(path: &str) -> Result<LexiconIndex, String> {
    let records =
        load_records_json(path).map_err(|e| format!("Failed to load lexicon {}: {}", path, e))?;
    Ok(LexiconIndex::build(records))
}
