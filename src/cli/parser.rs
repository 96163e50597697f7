//! CLI argument parsing and structure definitions

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use super::commands::{EvalArgs, ExtractArgs, LexiconArgs};

/// Clinical entity span matching and evaluation
#[derive(Parser, Debug)]
#[command(name = "clinspan")]
#[command(
    author,
    version,
    about = "Clinical entity span matching and span-level evaluation",
    long_about = r#"
clinspan - deterministic clinical entity extraction

Matches a curated lexicon and clinical regex patterns against Portuguese
free text and reports spans in original character offsets.

INPUTS:
  lexicon     JSON array of {"term", "entity_type", "priority", "metadata"}
  documents   JSONL, one {"doc_id", "text", "sentences": [[start, end], ...]}
              per line; without "sentences" every line of text is a sentence
  annotations JSONL, one {"doc_id", "entities": [{"start", "end", "type"}]}

EXAMPLES:
  clinspan extract -l lexicon.json "Paciente refere dor epigástrica"
  clinspan extract -l lexicon.json --documents notes.jsonl --format jsonl > pred.jsonl
  clinspan eval --gold gold.jsonl --pred pred.jsonl --mode iou_or_containment
  clinspan lexicon -l lexicon.json
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter implied by `-v` / `-q`; `RUST_LOG` still takes precedence.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract entity spans from text or documents
    #[command(visible_alias = "x")]
    Extract(ExtractArgs),

    /// Evaluate predictions against gold annotations
    #[command(visible_alias = "e")]
    Eval(EvalArgs),

    /// Build a lexicon index and report statistics and ambiguities
    #[command(visible_alias = "l")]
    Lexicon(LexiconArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable
    #[default]
    Human,
    /// One pretty-printed JSON value
    Json,
    /// One JSON object per line
    Jsonl,
}
