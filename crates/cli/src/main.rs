//! # feedlens-cli: A CLI for `feedlens`
//!
//! Runs the full analysis pipeline: load the feedback CSV, compute the
//! KPIs, sample and sanitize the free-text feedback, request structured
//! AI insights, and write a Markdown report.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feedlens::providers::ai::openai::OpenAiProvider;
use feedlens::{generate_insights, ingest, report, RetryPolicy};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a feedback CSV and generate a Markdown insight report
    Analyze(AnalyzeArgs),
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Path to the feedback CSV file
    csv_path: PathBuf,
    /// Where to write the Markdown report
    #[arg(long, default_value = "report.md")]
    out: PathBuf,
    /// Column holding the free-text feedback
    #[arg(long, default_value = "feedback")]
    text_col: String,
    /// Column holding the numeric rating
    #[arg(long, default_value = "rating")]
    rating_col: String,
    /// Column holding the entry date, used for newest-first sampling
    #[arg(long, default_value = "date")]
    date_col: String,
    /// Maximum number of feedback texts to sample
    #[arg(long, default_value_t = 200)]
    sample_size: usize,
    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "AI_API_URL")]
    api_url: String,
    /// API key for the provider
    #[arg(long, env = "AI_API_KEY")]
    api_key: Option<String>,
    /// Model name to request
    #[arg(long, env = "AI_MODEL")]
    model: Option<String>,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => analyze(args).await,
    }
}

async fn analyze(args: AnalyzeArgs) -> Result<()> {
    info!("Reading: {}", args.csv_path.display());
    let table = ingest::load_feedback(&args.csv_path)
        .with_context(|| format!("failed to load {}", args.csv_path.display()))?;

    let kpis = ingest::compute_kpis(&table, &args.rating_col);
    let raw_texts = ingest::sample_feedback(
        &table,
        &args.text_col,
        &args.date_col,
        args.sample_size,
    );

    let provider = OpenAiProvider::new(args.api_url, args.api_key, args.model)
        .context("failed to build AI provider")?;

    let (insight, sanitization) =
        generate_insights(&provider, &raw_texts, &kpis, &RetryPolicy::default())
            .await
            .context("AI insight generation failed; no report was written")?;

    for warning in sanitization.warnings() {
        eprintln!("guard rails: {warning}");
    }

    report::write_markdown_report(&args.out, &kpis, &insight, &sanitization.summary())
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    println!("Done! Report created: {}", args.out.display());
    Ok(())
}
