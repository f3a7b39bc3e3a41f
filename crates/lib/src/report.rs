//! # Markdown Report Rendering
//!
//! Renders the combined quantitative and qualitative results as a
//! shareable Markdown report: KPI overview, the AI insight sections and
//! a guard-rail transparency footer.

use crate::{ingest::KpiSummary, validate::InsightRecord};
use chrono::Local;
use std::{fs, io, path::Path};

fn render_list(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        return format!("## {title}\n\n- (none)\n\n");
    }
    let lines = items
        .iter()
        .map(|x| format!("- {x}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("## {title}\n\n{lines}\n\n")
}

/// Renders the full Markdown report.
pub fn render_markdown(kpis: &KpiSummary, insight: &InsightRecord, guards_note: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M");
    let mut md = format!("# Customer Insight Report\n\nGenerated: {timestamp}\n\n");

    md.push_str("## Overview\n\n");
    md.push_str(&format!(
        "- **Total responses:** {}\n",
        kpis.total_responses
    ));
    match kpis.avg_rating {
        Some(avg) => md.push_str(&format!("- **Average rating:** {avg} / 5\n")),
        None => md.push_str("- **Average rating:** (missing in dataset)\n"),
    }
    md.push_str("\n---\n\n");

    md.push_str("## TL;DR\n\n");
    md.push_str(&insight.tldr);
    md.push_str("\n\n");

    md.push_str(&render_list("Top Themes", &insight.themes));
    md.push_str(&render_list(
        "Recommended Improvements (Prioritized)",
        &insight.improvements,
    ));
    md.push_str(&render_list("Quick Wins", &insight.quick_wins));
    md.push_str(&render_list("Long-Term Actions", &insight.long_term));

    if !guards_note.is_empty() {
        md.push_str("---\n\n");
        md.push_str(&format!("**Safety & Guard Rails:** {guards_note}\n"));
    }

    md
}

/// Renders the report and writes it to `out_path`.
pub fn write_markdown_report(
    out_path: &Path,
    kpis: &KpiSummary,
    insight: &InsightRecord,
    guards_note: &str,
) -> io::Result<()> {
    fs::write(out_path, render_markdown(kpis, insight, guards_note))
}
