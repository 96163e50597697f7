//! Output formatting utilities for CLI commands

use std::io::{self, Write};

use serde::Serialize;

use crate::eval::{Counts, CorpusReport};
use crate::types::EntitySpan;

/// Write output to file or stdout
pub fn write_output(content: &str, path: Option<&str>) -> Result<(), String> {
    if let Some(path) = path {
        std::fs::write(path, content).map_err(|e| format!("Failed to write to {}: {}", path, e))?;
    } else {
        print!("{}", content);
        io::stdout()
            .flush()
            .map_err(|e| format!("Failed to flush stdout: {}", e))?;
    }
    Ok(())
}

/// Pretty JSON with a trailing newline.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| format!("Failed to serialize output: {}", e))
}

/// One compact JSON line.
pub fn to_json_line<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value)
        .map(|s| s + "\n")
        .map_err(|e| format!("Failed to serialize output: {}", e))
}

/// Human-readable entity table.
pub fn format_entities(entities: &[EntitySpan]) -> String {
    let mut out = String::new();
    for e in entities {
        out.push_str(&format!(
            "{:>5}..{:<5} {:<10} {:<13} {:.2}  {}\n",
            e.start,
            e.end,
            e.entity_type.as_label(),
            format!("{:?}", e.kind),
            e.score,
            e.surface_text
        ));
    }
    out
}

fn counts_row(name: &str, c: &Counts) -> String {
    format!(
        "{:<12} {:>6} {:>6} {:>6} {:>9.4} {:>9.4} {:>9.4}\n",
        name,
        c.tp,
        c.fp,
        c.fn_,
        c.precision(),
        c.recall(),
        c.f1()
    )
}

/// Human-readable corpus report.
pub fn format_report(report: &CorpusReport) -> String {
    let mut out = format!(
        "{:<12} {:>6} {:>6} {:>6} {:>9} {:>9} {:>9}\n",
        "type", "tp", "fp", "fn", "precision", "recall", "f1"
    );
    for (ty, counts) in &report.per_type {
        out.push_str(&counts_row(ty.as_label(), counts));
    }
    out.push_str(&counts_row("micro", &report.micro));
    out.push_str(&format!("macro f1: {:.4}\n", report.macro_f1()));

    let pairs = report.confusion.total();
    if pairs > 0 {
        out.push_str(&format!(
            "assertion accuracy: {:.4} over {} matched pairs\n",
            report.confusion.accuracy(),
            pairs
        ));
    }
    if !report.missing_predictions.is_empty() {
        out.push_str(&format!(
            "documents without predictions: {}\n",
            report.missing_predictions.join(", ")
        ));
    }
    if !report.missing_gold.is_empty() {
        out.push_str(&format!(
            "documents without gold: {}\n",
            report.missing_gold.join(", ")
        ));
    }
    out
}
