//! Batch orchestration: parse every input page, resolve and price its items,
//! and collect the output rows in input order.

use std::path::{Path, PathBuf};

use anyhow::Context;
use cmcsv_core::{assemble, merge_duplicates, OutputRecord, RawLineItem};
use cmcsv_scraper::{parse_order_page, ParsedRow};
use cmcsv_sources::{CatalogResolver, RateConverter, RateUnavailable};
use futures::stream::{self, StreamExt, TryStreamExt};

/// Knobs the orchestrator takes from the app config.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RunOptions {
    pub max_concurrent_lookups: usize,
    pub merge_duplicates: bool,
}

/// An input file that produced no records, and why.
#[derive(Debug)]
pub(crate) struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything a run produced.
#[derive(Debug, Default)]
pub(crate) struct RunReport {
    pub records: Vec<OutputRecord>,
    /// Inputs that parsed, in processing order.
    pub processed: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
    /// Article rows that could not become line items.
    pub skipped_rows: usize,
}

impl RunReport {
    pub(crate) fn needs_review(&self) -> usize {
        self.records.iter().filter(|r| r.needs_manual_review).count()
    }

    pub(crate) fn quantity_total(&self) -> u64 {
        self.records.iter().map(|r| u64::from(r.quantity.get())).sum()
    }
}

/// Converts every file in `files`.
///
/// A file that cannot be read or is not an order page is recorded as a
/// failure and the run moves on.
///
/// # Errors
///
/// Fails when `files` is empty, or when an item needs a price conversion and
/// no exchange rate is available.
pub(crate) async fn run(
    files: &[PathBuf],
    resolver: &CatalogResolver,
    converter: &RateConverter,
    options: RunOptions,
) -> anyhow::Result<RunReport> {
    if files.is_empty() {
        anyhow::bail!("no input files to process");
    }

    let mut report = RunReport::default();
    for path in files {
        let rows = match read_and_parse(path).await {
            Ok(rows) => rows,
            Err(err) => {
                let reason = format!("{err:#}");
                tracing::warn!(file = %path.display(), error = %reason, "skipping input file");
                report.failures.push(FileFailure {
                    path: path.clone(),
                    reason,
                });
                continue;
            }
        };

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            match row {
                ParsedRow::Item(item) => items.push(item),
                ParsedRow::Skipped { article_id, reason } => {
                    report.skipped_rows += 1;
                    tracing::warn!(
                        file = %path.display(),
                        article_id = article_id.as_deref().unwrap_or("?"),
                        %reason,
                        "skipping article row"
                    );
                }
            }
        }

        let records = process_items(&items, resolver, converter, options.max_concurrent_lookups)
            .await
            .with_context(|| format!("cannot price items from {}", path.display()))?;

        for record in records.iter().filter(|r| r.needs_manual_review) {
            tracing::warn!(
                file = %path.display(),
                name = %record.name,
                confidence = %record.confidence,
                missing = ?record.missing_fields(),
                candidates = ?record.candidate_summary(),
                "row needs manual input"
            );
        }

        tracing::info!(
            file = %path.display(),
            records = records.len(),
            "processed input file"
        );
        report.records.extend(records);
        report.processed.push(path.clone());
    }

    if options.merge_duplicates {
        let before = report.records.len();
        report.records = merge_duplicates(std::mem::take(&mut report.records));
        tracing::debug!(before, after = report.records.len(), "merged duplicate rows");
    }

    Ok(report)
}

async fn read_and_parse(path: &Path) -> anyhow::Result<Vec<ParsedRow>> {
    let document = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(parse_order_page(&document)?)
}

/// Resolves and prices `items` with up to `concurrency` lookups in flight,
/// returning records in item order. The rate is only fetched for priced items.
async fn process_items(
    items: &[RawLineItem],
    resolver: &CatalogResolver,
    converter: &RateConverter,
    concurrency: usize,
) -> Result<Vec<OutputRecord>, RateUnavailable> {
    stream::iter(items)
        .map(|item| async move {
            let matched = resolver.resolve(item).await;
            let rate = match item.unit_price_eur {
                Some(_) => Some(converter.rate().await?),
                None => None,
            };
            Ok::<_, RateUnavailable>(assemble(item, &matched, rate))
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
