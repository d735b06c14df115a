//! # Text News Digest
//!
//! Collects headlines, sectioned articles, editorials and market news from a
//! fixed set of listing pages and writes one plain-text digest per
//! collection per day.
//!
//! ## Features
//!
//! - Naver News section headlines, economy subsections and per-press editorials
//! - Finviz market news with per-publisher detail extraction
//! - Fuzzy title deduplication across the sections of a collection
//! - Detail enrichment (dates and body) with a mirror fallback
//! - Optional JSON copies and a per-day run log
//!
//! ## Usage
//!
//! ```sh
//! text_news_digest -o ./news -j ./json
//! ```
//!
//! ## Architecture
//!
//! Each collection runs the same pipeline:
//! 1. **Listing**: Collect article summaries from every section's listing page
//! 2. **Deduplication**: Drop near-identical titles and repeated URLs
//! 3. **Enrichment**: Fetch detail pages (bounded concurrency, per-host throttle)
//! 4. **Output**: Render the text digest, and optionally a JSON copy

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[macro_use]
mod macros;

mod cli;
mod config;
mod dedup;
mod extract;
mod fetch;
mod journal;
mod listing;
mod models;
mod outputs;
mod pipeline;
mod retry;
mod utils;

use cli::Cli;
use extract::ExtractorRegistry;
use fetch::{HttpFetcher, wait_for_connectivity};
use journal::RunJournal;
use outputs::{digest, json};
use retry::RetryFetch;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news digest starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.output_dir, ?args.json_output_dir, ?args.only, "Parsed CLI arguments");

    let config = config::load_config(args.config.as_deref())?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let log_dir = args.log_dir();
    let journal = RunJournal::new();
    journal.note(format!("Run for {date} started"));

    // Early check: ensure output dirs are writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }
    if let Some(json_dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(json_dir).await {
            error!(path = %json_dir, error = %e, "JSON output directory is not writable");
            return Err(e);
        }
    }

    let fetcher = RetryFetch::new(
        HttpFetcher::new(Duration::from_secs(config.timeout_secs))?,
        config.fetch_retries,
        Duration::from_secs(1),
    );

    // ---- Connectivity gate ----
    if args.skip_connectivity_check {
        info!("Skipping connectivity check");
    } else if !wait_for_connectivity(
        fetcher.inner(),
        &config.connectivity_probe_url,
        config.connectivity_attempts,
        Duration::from_secs(config.connectivity_interval_secs),
    )
    .await
    {
        journal.warn("No network connectivity; run abandoned");
        flush_journal(&journal, &log_dir, date).await;
        return Err("no network connectivity".into());
    }

    // ---- Collections, one at a time ----
    let registry = ExtractorRegistry::builtin();
    let mut completed = 0usize;
    let mut articles = 0usize;

    for collection in config.collections.iter().filter(|c| args.selects(&c.key)) {
        let settings = config.settings_for(collection);
        let result = pipeline::run_collection(&fetcher, &registry, collection, &settings, date, &journal).await;

        let text = digest::render_digest(&result, collection.labels);
        let path = digest::digest_path(&args.output_dir, &collection.key, &collection.file_stem, date);
        match digest::write_digest(&path, &text).await {
            Ok(()) => journal.note(format!("[{}] Saved {}", collection.key, path.display())),
            Err(e) => {
                error!(collection = %collection.key, path = %path.display(), error = %e, "Failed writing digest");
                journal.warn(format!("[{}] Could not save digest ({e})", collection.key));
            }
        }

        if let Some(json_dir) = &args.json_output_dir {
            if let Err(e) = json::write_digest_json(&result, &collection.key, json_dir).await {
                error!(collection = %collection.key, error = %e, "Failed to write JSON digest");
            }
        }

        if result.listing_completed() {
            completed += 1;
        } else {
            warn!(collection = %collection.key, "No listing page could be collected");
        }
        articles += result.article_count();
    }

    let elapsed = start_time.elapsed();
    journal.note(format!(
        "Run finished: {completed} collections, {articles} articles in {}s",
        elapsed.as_secs()
    ));
    flush_journal(&journal, &log_dir, date).await;
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        completed,
        articles,
        "Execution complete"
    );

    if completed == 0 {
        return Err("no collection completed its listing phase".into());
    }
    Ok(())
}

async fn flush_journal(journal: &RunJournal, log_dir: &str, date: chrono::NaiveDate) {
    if let Err(e) = journal.flush(log_dir, date).await {
        error!(%log_dir, error = %e, "Failed to write run log");
    }
}
