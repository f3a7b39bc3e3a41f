//! # Feedback to Structured Insight
//!
//! This crate ingests a tabular feedback dataset, computes basic KPIs,
//! sanitizes a bounded sample of free-text feedback, and asks a
//! configurable AI provider for a structured qualitative analysis. The
//! provider is called through a three-tier ladder that degrades
//! gracefully across endpoint versions, retries transient failures with
//! backoff, and never lets malformed model output past the validator.

pub mod errors;
pub mod extract;
pub mod guards;
pub mod ingest;
pub mod invoker;
pub mod prompts;
pub mod providers;
pub mod report;
pub mod validate;

pub use errors::InsightError;
pub use guards::SanitizationReport;
pub use ingest::KpiSummary;
pub use invoker::RetryPolicy;
pub use validate::InsightRecord;

use providers::ai::AiProvider;
use tracing::info;

/// Runs one full analysis: sanitize the samples, build the prompt pair,
/// invoke the provider ladder under the retry policy, and validate the
/// response into an [`InsightRecord`].
///
/// The sanitization report is returned alongside the record so callers
/// can surface the transparency footer. A failure here means the run has
/// no AI insight; there is no degraded or partial-success mode.
pub async fn generate_insights(
    provider: &dyn AiProvider,
    samples: &[String],
    kpis: &KpiSummary,
    policy: &RetryPolicy,
) -> Result<(InsightRecord, SanitizationReport), InsightError> {
    let (clean_samples, sanitization) = guards::sanitize_samples(samples);
    let user_prompt = prompts::build_user_prompt(kpis, &clean_samples);

    info!(
        samples = clean_samples.len(),
        warnings = sanitization.warnings().len(),
        "requesting AI insights"
    );
    let raw = invoker::invoke(
        provider,
        prompts::INSIGHT_SYSTEM_PROMPT,
        &user_prompt,
        policy,
    )
    .await?;

    let record = validate::validate_insight(&raw)?;
    Ok((record, sanitization))
}
