//! JSON copy of each digest.
//!
//! # Output Structure
//!
//! Files are organized by date with one file per collection:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── headlines.json
//!     ├── economics.json
//!     └── stock_news.json
//! ```
//!
//! A second run on the same day overwrites that day's file.

use crate::models::Digest;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`Digest`] to `{json_output_dir}/{date}/{collection}.json`.
///
/// # Returns
///
/// The path written, or an error if directory creation or file writing fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, %collection))]
pub async fn write_digest_json(
    digest: &Digest,
    collection: &str,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(digest)?;

    let full_json_dir = Path::new(json_output_dir).join(&digest.date);
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = full_json_dir.join(format!("{collection}.json"));
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename.display(), articles = digest.article_count(), "Wrote JSON digest");

    Ok(output_json_filename)
}
