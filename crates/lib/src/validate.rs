//! # Response Validation
//!
//! The single conversion point from untrusted provider output into the
//! strongly-typed [`InsightRecord`]. Nothing downstream ever sees raw
//! model JSON: either every required field is present and normalized
//! here, or the call fails terminally. Partial or default-filled records
//! are never produced.

use crate::errors::InsightError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const REQUIRED_KEYS: [&str; 5] = ["tldr", "themes", "improvements", "quick_wins", "long_term"];

/// The structured insight produced by one analysis run.
///
/// This is the only shape the rest of the pipeline is permitted to
/// consume from the LLM layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub tldr: String,
    pub themes: Vec<String>,
    pub improvements: Vec<String>,
    pub quick_wins: Vec<String>,
    pub long_term: Vec<String>,
}

/// Renders any JSON value as a plain string. Strings are unquoted;
/// everything else uses its compact JSON form.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerces a field into a list of strings. Non-array values become a
/// single-element list of their string rendering; array elements are
/// string-coerced individually. The provider's output is never assumed
/// well-typed, even after the presence check.
fn value_to_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(value_to_string).collect(),
        other => vec![value_to_string(other)],
    }
}

/// Parses and validates raw provider text into an [`InsightRecord`].
///
/// Non-JSON input and a missing required key are terminal errors; the
/// normalization step itself is total over any JSON value types.
pub fn validate_insight(raw: &str) -> Result<InsightRecord, InsightError> {
    let data: Value = serde_json::from_str(raw).map_err(InsightError::NonJsonOutput)?;

    for key in REQUIRED_KEYS {
        if data.get(key).is_none() {
            return Err(InsightError::MissingKey(key.to_string()));
        }
    }

    Ok(InsightRecord {
        tldr: value_to_string(&data["tldr"]),
        themes: value_to_string_list(&data["themes"]),
        improvements: value_to_string_list(&data["improvements"]),
        quick_wins: value_to_string_list(&data["quick_wins"]),
        long_term: value_to_string_list(&data["long_term"]),
    })
}
