//! clinspan - clinical entity span matching CLI
//!
//! # Usage
//!
//! ```bash
//! # Extract from text
//! clinspan extract -l lexicon.json "Paciente refere dor epigástrica"
//!
//! # Extract a corpus, then evaluate it
//! clinspan extract -l lexicon.json --documents notes.jsonl --format jsonl -o pred.jsonl
//! clinspan eval --gold gold.jsonl --pred pred.jsonl --mode iou_or_min_cov_or_containment
//!
//! # Inspect lexicon ambiguities
//! clinspan lexicon -l lexicon.json
//! ```

use std::process::ExitCode;

use clap::Parser;
use clinspan::cli::{run, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
