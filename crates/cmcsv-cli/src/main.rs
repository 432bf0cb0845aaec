mod inputs;
mod output;
mod pipeline;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cmcsv_core::AppConfig;
use cmcsv_sources::{CatalogResolver, EcbClient, RateConverter, RetryPolicy, ScryfallClient};
use tracing_subscriber::EnvFilter;

use crate::pipeline::RunOptions;

#[derive(Debug, Parser)]
#[command(name = "cmcsv")]
#[command(about = "Convert saved Cardmarket order pages into an Archidekt import CSV")]
struct Cli {
    /// Directory holding saved order pages (overrides `CMCSV_INPUT_DIR`).
    #[arg(long)]
    input_dir: Option<PathBuf>,
    /// Directory the CSV is written to (overrides `CMCSV_OUTPUT_DIR`).
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Directory processed pages are moved to (overrides `CMCSV_COMPLETED_DIR`).
    #[arg(long)]
    completed_dir: Option<PathBuf>,
    /// Leave processed pages in the input directory.
    #[arg(long)]
    keep_inputs: bool,
}

impl Cli {
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.input_dir {
            config.input_dir.clone_from(dir);
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(dir) = &self.completed_dir {
            config.completed_dir.clone_from(dir);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = cmcsv_core::load_app_config()?;
    cli.apply_to(&mut config);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    convert(&config, cli.keep_inputs).await
}

async fn convert(config: &AppConfig, keep_inputs: bool) -> anyhow::Result<()> {
    inputs::ensure_dirs(&[&config.output_dir, &config.completed_dir])?;

    let files = inputs::list_input_files(&config.input_dir, &config.input_extension)?;
    tracing::info!(
        input_dir = %config.input_dir.display(),
        files = files.len(),
        "starting conversion"
    );

    let retry = RetryPolicy::new(config.max_retries, config.retry_backoff_base_ms);
    let resolver = CatalogResolver::new(
        ScryfallClient::with_base_url(
            &config.scryfall_base_url,
            config.http_timeout_secs,
            &config.user_agent,
            retry,
        )
        .context("failed to build Scryfall client")?,
    );
    let converter = RateConverter::new(
        EcbClient::with_base_url(
            &config.ecb_base_url,
            config.http_timeout_secs,
            &config.user_agent,
            retry,
        )
        .context("failed to build ECB client")?,
        config.fallback_rate,
    );

    let report = pipeline::run(
        &files,
        &resolver,
        &converter,
        RunOptions {
            max_concurrent_lookups: config.max_concurrent_lookups,
            merge_duplicates: config.merge_duplicates,
        },
    )
    .await?;

    if report.records.is_empty() {
        tracing::warn!("no records extracted, no output written");
    } else {
        let path = output::write_output_file(&config.output_dir, &report.records)?;
        tracing::info!(
            file = %path.display(),
            rows = report.records.len(),
            cards = report.quantity_total(),
            needs_review = report.needs_review(),
            "wrote output"
        );
    }

    if report.skipped_rows > 0 {
        tracing::warn!(rows = report.skipped_rows, "article rows skipped");
    }
    for failure in &report.failures {
        tracing::error!(file = %failure.path.display(), reason = %failure.reason, "input file failed");
    }
    if let Some(rate) = converter.resolved() {
        tracing::info!(
            rate = %rate.rate,
            origin = ?rate.origin,
            fetched_at = %rate.fetched_at.to_rfc3339(),
            "exchange rate used for this run"
        );
        if converter.used_fallback() {
            tracing::warn!("prices were converted with the fallback exchange rate");
        }
    }
    let distinct_lookups = resolver.cached_keys().await;
    tracing::debug!(distinct_lookups, "catalog lookups resolved");

    if !keep_inputs && !report.records.is_empty() {
        let moved = inputs::move_to_completed(&report.processed, &config.completed_dir);
        tracing::info!(
            moved,
            completed_dir = %config.completed_dir.display(),
            "moved processed inputs"
        );
    }

    if report.processed.is_empty() {
        anyhow::bail!("all {} input files failed", report.failures.len());
    }
    Ok(())
}
