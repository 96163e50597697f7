//! Eval command: corpus-level span evaluation

use clap::{Parser, ValueEnum};

use super::super::output::{format_report, to_json, write_output};
use super::super::parser::OutputFormat;
use super::super::utils::read_json_records;

use crate::eval::{evaluate_corpus, EvalConfig, EvalDocument, MatchMode, MissingDocumentPolicy};

/// Evaluate predictions against gold annotations
#[derive(Parser, Debug)]
pub struct EvalArgs {
    /// Gold annotations (JSONL or JSON array of documents)
    #[arg(short, long, value_name = "PATH")]
    pub gold: String,

    /// Predicted annotations (JSONL or JSON array of documents)
    #[arg(short, long, value_name = "PATH")]
    pub pred: String,

    /// Evaluation configuration JSON file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<String>,

    /// Matching mode (overrides config)
    #[arg(short, long)]
    pub mode: Option<MatchMode>,

    /// Overlap threshold in [0, 1] (overrides config)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Handling of documents present on one side only (overrides config)
    #[arg(long, value_enum)]
    pub missing: Option<MissingArg>,

    /// Output format (human or json)
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,
}

/// Missing-document policy as a CLI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MissingArg {
    /// Count as all-FN / all-FP
    Count,
    /// Leave out and report
    Skip,
    /// Fail
    Error,
}

impl From<MissingArg> for MissingDocumentPolicy {
    fn from(arg: MissingArg) -> Self {
        match arg {
            MissingArg::Count => MissingDocumentPolicy::CountAsUnmatched,
            MissingArg::Skip => MissingDocumentPolicy::Skip,
            MissingArg::Error => MissingDocumentPolicy::Error,
        }
    }
}

impl EvalArgs {
    /// Configuration file (or defaults) with command-line overrides applied.
    pub fn eval_config(&self) -> Result<EvalConfig, String> {
        let mut config = match &self.config {
            Some(path) => EvalConfig::from_json_file(path)
                .map_err(|e| format!("Failed to load config {}: {}", path, e))?,
            None => EvalConfig::default(),
        };
        if let Some(mode) = self.mode {
            config = config.with_mode(mode);
        }
        if let Some(threshold) = self.threshold {
            config = config.with_threshold(threshold);
        }
        if let Some(missing) = self.missing {
            config = config.with_missing_documents(missing.into());
        }
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

/// Run the eval command.
pub fn cmd_eval(args: EvalArgs) -> Result<(), String> {
    let config = args.eval_config()?;
    let gold: Vec<EvalDocument> = read_json_records(&args.gold)?;
    let pred: Vec<EvalDocument> = read_json_records(&args.pred)?;

    let report = evaluate_corpus(&gold, &pred, &config).map_err(|e| e.to_string())?;

    let content = match args.format {
        OutputFormat::Human => format!(
            "mode: {}  threshold: {}\n{}",
            config.mode.name(),
            config.threshold,
            format_report(&report)
        ),
        OutputFormat::Json | OutputFormat::Jsonl => to_json(&report)?,
    };
    write_output(&content, args.output.as_deref())
}
