//! # Input Sanitization & Prompt-Injection Guard Rails
//!
//! This module transforms raw feedback samples into a bounded, cleaned
//! set of strings that are safe to embed in the evidence section of an
//! LLM prompt, and records everything suspicious it saw along the way.
//!
//! Per sample the pipeline is: strip control characters, truncate to the
//! per-sample cap, neutralize role markers. Suspicious-pattern detection
//! runs against the *original* text, before and independently of the
//! transform, so the transparency log shows what was attempted rather
//! than what survived.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Hard cap on the number of samples sent to the model.
pub const MAX_SAMPLES: usize = 200;
/// Hard cap on characters per sample.
pub const MAX_CHARS_PER_SAMPLE: usize = 800;

const TRUNCATION_MARKER: &str = " …[truncated]";
const NO_WARNINGS_SUMMARY: &str = "Guard rails: OK (no suspicious patterns detected).";
const SUMMARY_MAX_ENTRIES: usize = 8;

/// Known prompt-injection phrasings. Matches are warned about; only the
/// role markers below are also redacted from the outgoing text.
static SUSPECT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bignore all instructions\b",
        r"(?i)\boverride\b.*\binstructions\b",
        r"(?i)\bdisregard\b.*\brules\b",
        r"(?i)\bsystem:",
        r"(?i)\bassistant:",
        r"(?i)\buser:.*\bsystem\b",
        r"(?i)<<.*system.*>>",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("suspect pattern is a valid regex"))
    .collect()
});

static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B-\x1F\x7F]").expect("control char class is valid"));

/// Role markers that could impersonate a conversation role, paired with
/// the name encoded into their redaction marker.
static ROLE_MARKERS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [("system", r"(?i)\bsystem:"), ("assistant", r"(?i)\bassistant:"), ("user", r"(?i)\buser:")]
        .iter()
        .map(|(role, p)| (Regex::new(p).expect("role marker is a valid regex"), *role))
        .collect()
});

/// The transparency log of one sanitization pass.
///
/// Warnings are informational only; the sanitizer never fails. The
/// report is produced once per call and immutable thereafter.
#[derive(Debug, Clone, Default)]
pub struct SanitizationReport {
    warnings: Vec<String>,
}

impl SanitizationReport {
    /// The raw, ordered warning list.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// A capped, human-readable summary for a report footer.
    pub fn summary(&self) -> String {
        summarize(&self.warnings)
    }
}

/// Builds the capped guard-rail summary from a warning sequence.
///
/// Deduplicates preserving first-seen order, keeps at most 8 entries and
/// appends a count of anything omitted. An empty sequence yields a fixed
/// all-clear sentence.
pub fn summarize(warnings: &[String]) -> String {
    if warnings.is_empty() {
        return NO_WARNINGS_SUMMARY.to_string();
    }
    let mut uniq: Vec<&str> = Vec::new();
    for w in warnings {
        if !uniq.contains(&w.as_str()) {
            uniq.push(w);
        }
    }
    let more = if uniq.len() > SUMMARY_MAX_ENTRIES {
        format!(" (+{} more)", uniq.len() - SUMMARY_MAX_ENTRIES)
    } else {
        String::new()
    };
    uniq.truncate(SUMMARY_MAX_ENTRIES);
    format!("Guard rails warnings: {}{more}", uniq.join("; "))
}

fn strip_control_chars(text: &str) -> String {
    CONTROL_CHARS.replace_all(text, "").into_owned()
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let truncated: String = text.chars().take(limit).collect();
    format!("{truncated}{TRUNCATION_MARKER}")
}

/// Replaces role markers that try to impersonate a conversation role
/// with an inert marker that records which role was claimed.
fn neutralize_role_markers(text: &str) -> String {
    let mut out = text.to_string();
    for (re, role) in ROLE_MARKERS.iter() {
        out = re
            .replace_all(&out, format!("[role-redacted:{role}]"))
            .into_owned();
    }
    out
}

fn detect_suspicious(text: &str) -> Vec<String> {
    SUSPECT_PATTERNS
        .iter()
        .filter(|re| re.is_match(text))
        .map(|re| format!("Suspicious pattern matched: /{}/", re.as_str()))
        .collect()
}

/// Sanitizes raw feedback samples for inclusion in a prompt.
///
/// Enforces the sample-count cap, strips control characters, truncates
/// oversized samples and neutralizes role markers, while collecting a
/// warning for every suspicious pattern found in the original text.
/// This function is total: it transforms and logs, it never errors.
pub fn sanitize_samples(samples: &[String]) -> (Vec<String>, SanitizationReport) {
    let mut warnings: Vec<String> = Vec::new();
    if samples.len() > MAX_SAMPLES {
        warnings.push(format!(
            "Sample count capped: {} -> {MAX_SAMPLES}",
            samples.len()
        ));
    }

    let mut clean = Vec::with_capacity(samples.len().min(MAX_SAMPLES));
    for original in samples.iter().take(MAX_SAMPLES) {
        let stripped = strip_control_chars(original);
        let truncated = truncate(&stripped, MAX_CHARS_PER_SAMPLE);
        let neutralized = neutralize_role_markers(&truncated);

        warnings.extend(detect_suspicious(original));
        clean.push(neutralized);
    }

    debug!(
        samples = clean.len(),
        warnings = warnings.len(),
        "sanitization pass complete"
    );
    (clean, SanitizationReport { warnings })
}
