//! Extract command: lexicon + pattern matching over text or documents

use clap::Parser;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::super::output::{format_entities, to_json, to_json_line, write_output};
use super::super::parser::OutputFormat;
use super::super::utils::{get_input_text, read_json_records};
use super::load_index;

use crate::config::ExtractorConfig;
use crate::extract::{Diagnostics, Extraction, Extractor, Sentence};
use crate::types::{EntitySpan, EntityType};

/// Extract entity spans
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Lexicon JSON file
    #[arg(short, long, value_name = "PATH")]
    pub lexicon: String,

    /// Extractor configuration JSON file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<String>,

    /// Input text to process
    #[arg(short, long)]
    pub text: Option<String>,

    /// Read input text from file
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<String>,

    /// JSONL documents with optional sentence offsets
    #[arg(long, value_name = "PATH", conflicts_with_all = ["text", "file"])]
    pub documents: Option<String>,

    /// Disable the fuzzy pass
    #[arg(long)]
    pub no_fuzzy: bool,

    /// Keep only these entity types (repeatable)
    #[arg(long = "label", value_name = "TYPE")]
    pub labels: Vec<EntityType>,

    /// Output format
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Positional text argument
    #[arg(trailing_var_arg = true)]
    pub positional: Vec<String>,
}

/// One input document.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentInput {
    /// Document id
    #[serde(alias = "case_id")]
    pub doc_id: String,
    /// Full document text
    pub text: String,
    /// Sentence `[start, end)` char offsets; every line is a sentence when absent
    #[serde(default)]
    pub sentences: Option<Vec<(usize, usize)>>,
}

impl DocumentInput {
    /// Sentences of this document, in document order.
    pub fn sentences(&self) -> Vec<Sentence> {
        match &self.sentences {
            Some(bounds) => bounds
                .iter()
                .filter_map(|&(start, end)| {
                    match Sentence::from_document(&self.text, start, end) {
                        Ok(sentence) => Some(sentence),
                        Err(e) => {
                            warn!("{}: skipping sentence: {}", self.doc_id, e);
                            None
                        }
                    }
                })
                .collect(),
            None => line_sentences(&self.text),
        }
    }
}

/// Every non-blank line as one sentence.
pub fn line_sentences(text: &str) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for line in text.split('\n') {
        let content = line.strip_suffix('\r').unwrap_or(line);
        if !content.trim().is_empty() {
            sentences.push(Sentence::new(content, start));
        }
        start += line.chars().count() + 1;
    }
    sentences
}

/// Extraction output for one document, readable back as an evaluation document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutput {
    /// Document id
    pub doc_id: String,
    /// Extracted spans
    pub entities: Vec<EntitySpan>,
    /// Pipeline diagnostics
    pub diagnostics: Diagnostics,
}

/// Run the extract command.
pub fn cmd_extract(args: ExtractArgs) -> Result<(), String> {
    let index = load_index(&args.lexicon)?;

    let mut config = match &args.config {
        Some(path) => ExtractorConfig::from_json_file(path)
            .map_err(|e| format!("Failed to load config {}: {}", path, e))?,
        None => ExtractorConfig::default(),
    };
    if args.no_fuzzy {
        config.passes.fuzzy = false;
    }
    let extractor = Extractor::with_config(&index, &config).map_err(|e| e.to_string())?;

    let documents: Vec<DocumentInput> = match &args.documents {
        Some(path) => read_json_records(path)?,
        None => vec![DocumentInput {
            doc_id: "input".to_string(),
            text: get_input_text(&args.text, args.file.as_deref(), &args.positional)?,
            sentences: None,
        }],
    };

    let start = Instant::now();
    let sentences: Vec<Vec<Sentence>> = documents.iter().map(DocumentInput::sentences).collect();
    let extractions = extract_all(&extractor, &sentences);
    info!(
        "extracted {} documents in {:.1}ms",
        documents.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    let outputs: Vec<DocumentOutput> = documents
        .into_iter()
        .zip(extractions)
        .map(|(doc, extraction)| {
            let mut entities = extraction.entities;
            if !args.labels.is_empty() {
                entities.retain(|e| args.labels.contains(&e.entity_type));
            }
            DocumentOutput {
                doc_id: doc.doc_id,
                entities,
                diagnostics: extraction.diagnostics,
            }
        })
        .collect();

    let content = match args.format {
        OutputFormat::Human => outputs
            .iter()
            .map(|doc| {
                format!(
                    "# {} ({} entities, {} candidates, {} dropped)\n{}",
                    doc.doc_id,
                    doc.entities.len(),
                    doc.diagnostics.candidates,
                    doc.diagnostics.dropped.len(),
                    format_entities(&doc.entities)
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => to_json(&outputs)?,
        OutputFormat::Jsonl => outputs
            .iter()
            .map(to_json_line)
            .collect::<Result<Vec<_>, _>>()?
            .concat(),
    };
    write_output(&content, args.output.as_deref())
}

#[cfg(feature = "parallel")]
fn extract_all(extractor: &Extractor<'_>, documents: &[Vec<Sentence>]) -> Vec<Extraction> {
    extractor.extract_documents(documents)
}

#[cfg(not(feature = "parallel"))]
fn extract_all(extractor: &Extractor<'_>, documents: &[Vec<Sentence>]) -> Vec<Extraction> {
    documents
        .iter()
        .map(|sentences| extractor.extract_document(sentences))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_sentences_offsets() {
        let text = "Febre alta.\r\n\nDor no tórax.";
        let sentences = line_sentences(text);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "Febre alta.");
        assert_eq!((sentences[0].start, sentences[0].end), (0, 11));
        assert_eq!(sentences[1].start, 14);
        let doc_chars: String = text.chars().skip(14).take(sentences[1].char_len()).collect();
        assert_eq!(doc_chars, "Dor no tórax.");
    }

    #[test]
    fn test_explicit_sentences_skip_invalid() {
        let doc: DocumentInput = serde_json::from_str(
            r#"{"doc_id": "d1", "text": "Nega febre. Tosse seca.", "sentences": [[0, 11], [12, 23], [20, 99]]}"#,
        )
        .unwrap();
        let sentences = doc.sentences();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1].text, "Tosse seca.");
    }
}
