//! Command-line interface definitions for the news digest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most arguments can be provided via command-line flags or `NEWS_DIGEST_*`
//! environment variables.

use chrono::NaiveDate;
use clap::Parser;

/// Command-line arguments for the news digest.
///
/// # Examples
///
/// ```sh
/// # Every configured collection into ./news
/// text_news_digest -o ./news
///
/// # Only the finance digest, with a JSON copy
/// text_news_digest -o ./news -j ./json --only stock_news
///
/// # Re-render a given day from a custom configuration
/// text_news_digest -o ./news -c ./digest.yaml --date 2025-05-06
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Root directory for the text digests
    #[arg(short, long, env = "NEWS_DIGEST_OUTPUT_DIR")]
    pub output_dir: String,

    /// Optional path to a YAML configuration file
    #[arg(short, long, env = "NEWS_DIGEST_CONFIG")]
    pub config: Option<String>,

    /// Also write each digest as JSON under this directory
    #[arg(short, long, env = "NEWS_DIGEST_JSON_OUTPUT_DIR")]
    pub json_output_dir: Option<String>,

    /// Directory for the per-day run log (defaults to `{output_dir}/logs`)
    #[arg(short, long, env = "NEWS_DIGEST_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Date stamped on the digests, `YYYY-MM-DD` (defaults to today)
    #[arg(short, long, env = "NEWS_DIGEST_DATE")]
    pub date: Option<NaiveDate>,

    /// Run only these collection keys (repeatable)
    #[arg(long)]
    pub only: Vec<String>,

    /// Start collecting without probing connectivity first
    #[arg(long, env = "NEWS_DIGEST_SKIP_CONNECTIVITY_CHECK")]
    pub skip_connectivity_check: bool,
}

impl Cli {
    pub fn log_dir(&self) -> String {
        self.log_dir
            .clone()
            .unwrap_or_else(|| format!("{}/logs", self.output_dir.trim_end_matches('/')))
    }

    /// Whether the collection `key` was selected with `--only`.
    pub fn selects(&self, key: &str) -> bool {
        self.only.is_empty() || self.only.iter().any(|k| k == key)
    }
}
