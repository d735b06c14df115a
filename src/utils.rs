//! Utility functions for text cleanup, truncation, and file system operations.
//!
//! This module provides helpers used throughout the application:
//! - Whitespace normalisation of scraped element text
//! - Character-budget truncation with an ellipsis suffix
//! - Log previews for long strings
//! - File system validation for output directories

use scraper::{ElementRef, Selector};
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Suffix appended to any text cut down to its character budget.
pub const ELLIPSIS: &str = "...";

/// Collapse every run of whitespace into a single space and trim both ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(squash_whitespace("  Fed\n  raises\trates "), "Fed raises rates");
/// ```
pub fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an element with whitespace normalised.
pub fn element_text(element: ElementRef<'_>) -> String {
    squash_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// `Some(s)` unless `s` is empty.
pub fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Text of the first element matching `selector` under `scope`, if non-empty.
pub fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(element_text).and_then(non_empty)
}

/// Cut `s` to `cap` characters and append [`ELLIPSIS`] when it is longer.
///
/// Counting is done in Unicode scalar values so Hangul titles are never split
/// inside a code point. Input at or under the cap is returned unchanged.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc...");
/// assert_eq!(truncate_with_ellipsis("abc", 3), "abc");
/// ```
pub fn truncate_with_ellipsis(s: &str, cap: usize) -> String {
    match s.char_indices().nth(cap) {
        Some((byte_idx, _)) => format!("{}{}", &s[..byte_idx], ELLIPSIS),
        None => s.to_string(),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a byte
/// count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}…(+{} bytes)", &s[..byte_idx], s.len() - byte_idx),
        None => s.to_string(),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
