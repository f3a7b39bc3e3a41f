//! # JSON Extraction
//!
//! Pulls one JSON object out of free-form model output. Only the
//! unstructured chat tier needs this: without a forced-JSON response
//! mode the model may wrap its answer in commentary or a fenced code
//! block.

use crate::errors::InsightError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced block pattern is valid")
});

/// Extracts the first JSON object from arbitrary text.
///
/// Strategy:
/// 1. A fenced code block (triple-backtick, optionally tagged `json`)
///    wrapping an object is parsed first.
/// 2. Otherwise, scan from the first `{` keeping a brace-depth counter
///    that treats characters inside double-quoted strings (including
///    escaped quotes) as non-structural, and parse the balanced slice.
/// 3. As a last resort, parse the entire text directly.
///
/// A parse failure is an error for this call, never a silent empty
/// object.
pub fn extract_json(text: &str) -> Result<Value, InsightError> {
    if let Some(caps) = FENCED_JSON.captures(text) {
        let candidate = &caps[1];
        return serde_json::from_str(candidate)
            .map_err(|e| InsightError::Extraction(format!("fenced block is not valid JSON: {e}")));
    }

    if let Some(candidate) = balanced_object(text) {
        return serde_json::from_str(candidate).map_err(|e| {
            InsightError::Extraction(format!("balanced object is not valid JSON: {e}"))
        });
    }

    serde_json::from_str(text)
        .map_err(|e| InsightError::Extraction(format!("text contains no JSON object: {e}")))
}

/// Returns the slice from the first `{` to its matching `}`, honoring
/// quoted strings and escapes, or `None` if no balanced object exists.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_str = false;
    let mut escape = false;

    for (i, ch) in text[start..].char_indices() {
        if in_str {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_str = false;
            }
        } else {
            match ch {
                '"' => in_str = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..start + i + ch.len_utf8()]);
                    }
                }
                _ => {}
            }
        }
    }
    None
}
