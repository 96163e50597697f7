//! Input helpers for CLI commands

use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Get input text from the `--text` flag, a file, positional words, or stdin.
pub fn get_input_text(
    text: &Option<String>,
    file: Option<&str>,
    positional: &[String],
) -> Result<String, String> {
    if let Some(t) = text {
        Ok(t.clone())
    } else if let Some(f) = file {
        read_input_file(f)
    } else if !positional.is_empty() {
        Ok(positional.join(" "))
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Ok(buffer)
    }
}

/// Read input from file
pub fn read_input_file(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read file {}: {}", path, e))
}

/// Parse a file holding either a JSON array or one JSON value per line.
pub fn read_json_records<T: DeserializeOwned>(path: &str) -> Result<Vec<T>, String> {
    let content = read_input_file(path)?;
    parse_json_records(&content).map_err(|e| format!("{}: {}", path, e))
}

/// Parse a JSON array, or JSONL with blank lines ignored.
pub fn parse_json_records<T: DeserializeOwned>(content: &str) -> Result<Vec<T>, String> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).map_err(|e| format!("invalid JSON array: {}", e));
    }
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| format!("line {}: {}", i + 1, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::EvalDocument;

    #[test]
    fn test_parse_jsonl_and_array() {
        let jsonl = r#"{"doc_id": "a", "entities": []}

{"case_id": "b", "entities": [{"start": 0, "end": 3, "type": "SYMPTOM"}]}
"#;
        let docs: Vec<EvalDocument> = parse_json_records(jsonl).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].doc_id, "b");

        let array = r#"[{"doc_id": "a"}]"#;
        let docs: Vec<EvalDocument> = parse_json_records(array).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].entities.is_empty());
    }

    #[test]
    fn test_parse_error_names_line() {
        let err = parse_json_records::<EvalDocument>("{\"doc_id\": \"a\"}\nnot json\n").unwrap_err();
        assert!(err.starts_with("line 2:"), "{err}");
    }
}
