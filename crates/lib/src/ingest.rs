//! # Feedback Ingestion, KPIs & Sampling
//!
//! Loads the tabular feedback dataset from CSV with normalized column
//! names, computes the basic KPIs (response count, average rating), and
//! selects a bounded newest-first sample of free-text feedback for the
//! analysis prompt. The selected texts are raw at this stage;
//! sanitization happens in [`crate::guards`].

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// The minimum column the dataset must provide.
pub const REQUIRED_COLUMN: &str = "feedback";

/// Custom error types for the feedback ingestion process.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV is missing required column: {0}")]
    MissingColumn(String),
}

/// An in-memory feedback dataset with normalized headers.
#[derive(Debug, Clone)]
pub struct FeedbackTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl FeedbackTable {
    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All values of one column, in row order. `None` when the column
    /// does not exist.
    fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

/// The quantitative summary handed to the prompt builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_responses: u64,
    /// Mean of the parseable ratings, rounded to two decimals. `None`
    /// when the rating column is absent or nothing in it parses.
    pub avg_rating: Option<f64>,
}

/// Loads the CSV at `path`, normalizing column names (trimmed and
/// lowercased) and ensuring the required `feedback` column exists.
pub fn load_feedback(path: &Path) -> Result<FeedbackTable, IngestError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    if !headers.iter().any(|h| h == REQUIRED_COLUMN) {
        return Err(IngestError::MissingColumn(REQUIRED_COLUMN.to_string()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    info!(rows = rows.len(), "loaded feedback dataset");
    Ok(FeedbackTable { headers, rows })
}

/// Computes the KPI summary: total row count plus the mean rating when
/// the rating column exists and contains parseable numbers.
pub fn compute_kpis(table: &FeedbackTable, rating_col: &str) -> KpiSummary {
    let total_responses = table.len() as u64;

    let avg_rating = table.column(rating_col).and_then(|values| {
        let ratings: Vec<f64> = values
            .iter()
            .filter_map(|v| v.trim().parse::<f64>().ok())
            .collect();
        if ratings.is_empty() {
            None
        } else {
            let avg = ratings.iter().sum::<f64>() / ratings.len() as f64;
            Some((avg * 100.0).round() / 100.0)
        }
    });

    KpiSummary {
        total_responses,
        avg_rating,
    }
}

/// Lenient date parsing for the sampling sort. Unparseable values sort
/// after every parseable one.
fn parse_date(field: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%-m/%-d/%Y %-H:%M:%S",
    ];
    const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%-m/%-d/%Y"];

    let field = field.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(field, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(field, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?);
        }
    }
    None
}

/// Returns up to `n` feedback texts, newest first when the date column
/// parses. Empty and whitespace-only texts are dropped.
pub fn sample_feedback(
    table: &FeedbackTable,
    text_col: &str,
    date_col: &str,
    n: usize,
) -> Vec<String> {
    let texts = match table.column(text_col) {
        Some(texts) => texts,
        None => return Vec::new(),
    };

    let mut indexed: Vec<(usize, Option<NaiveDateTime>)> = match table.column(date_col) {
        Some(dates) => dates
            .iter()
            .enumerate()
            .map(|(i, d)| (i, parse_date(d)))
            .collect(),
        None => (0..texts.len()).map(|i| (i, None)).collect(),
    };

    // Newest first; rows without a parseable date keep their order at
    // the end.
    indexed.sort_by(|a, b| b.1.cmp(&a.1));

    let samples: Vec<String> = indexed
        .iter()
        .filter_map(|(i, _)| {
            let text = texts.get(*i)?.trim();
            if text.is_empty() {
                None
            } else {
                Some(text.to_string())
            }
        })
        .take(n)
        .collect();

    debug!(selected = samples.len(), cap = n, "sampled feedback texts");
    samples
}
