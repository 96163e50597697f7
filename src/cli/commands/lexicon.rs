//! Lexicon command: index statistics and load diagnostics

use clap::Parser;
use serde::Serialize;

use super::super::output::{to_json, write_output};
use super::super::parser::OutputFormat;
use super::load_index;

use crate::lexicon::{Ambiguity, IndexStats, LexiconIndex, RejectedRecord};

/// Inspect a lexicon
#[derive(Parser, Debug)]
pub struct LexiconArgs {
    /// Lexicon JSON file
    #[arg(short, long, value_name = "PATH")]
    pub lexicon: String,

    /// Output format (human or json)
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,
}

#[derive(Serialize)]
struct LexiconReport<'a> {
    stats: IndexStats,
    ambiguities: &'a [Ambiguity],
    rejected: &'a [RejectedRecord],
}

/// Run the lexicon command.
pub fn cmd_lexicon(args: LexiconArgs) -> Result<(), String> {
    let index = load_index(&args.lexicon)?;
    let content = match args.format {
        OutputFormat::Human => format_lexicon(&index),
        OutputFormat::Json | OutputFormat::Jsonl => to_json(&LexiconReport {
            stats: index.stats(),
            ambiguities: index.ambiguities(),
            rejected: index.rejected(),
        })?,
    };
    write_output(&content, args.output.as_deref())
}

fn format_lexicon(index: &LexiconIndex) -> String {
    let stats = index.stats();
    let mut out = format!(
        "entries: {} ({} single-token, {} multi-token)\n",
        stats.entries, stats.single_token, stats.multi_token
    );
    for (ty, n) in &stats.per_type {
        out.push_str(&format!("  {:<10} {}\n", ty.as_label(), n));
    }
    out.push_str(&format!("ambiguities: {}\n", stats.ambiguities));
    for a in index.ambiguities() {
        let kept = index
            .entry(a.kept)
            .map(|e| format!("{} ({})", e.original_term, e.entity_type))
            .unwrap_or_default();
        out.push_str(&format!(
            "  '{}': kept {}, discarded #{} {} ({})\n",
            a.normalized_term, kept, a.discarded_load_index, a.discarded_term, a.discarded_type
        ));
    }
    out.push_str(&format!("rejected: {}\n", stats.rejected));
    for r in index.rejected() {
        out.push_str(&format!("  #{} '{}': {}\n", r.load_index, r.term, r.reason));
    }
    out
}
