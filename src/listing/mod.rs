//! Listing page collectors.
//!
//! A listing page enumerates article summaries for one section. Each layout
//! has a pure `parse_*` function over the parsed page, and
//! [`collect_listing`] ties fetch and parse together.
//!
//! # Supported Layouts
//!
//! | Kind | Module | Container | Alternate container |
//! |------|--------|-----------|---------------------|
//! | Headline | [`naver`] | `div.section_component.as_section_headline` | class contains `as_section_headline` |
//! | Latest | [`naver`] | `.section_latest` | class contains `section_latest` |
//! | Editorial | [`naver`] | `.opinion_editorial_list` | class contains `opinion_editorial_list` |
//! | Finviz | [`finviz`] | `#news` | id contains `news` |
//!
//! A missing container is an expected condition (markup drifts without
//! notice): it is logged and the page yields no entries. An item missing its
//! required field is skipped without affecting the rest of the page.

use crate::config::{ListingKind, PipelineSettings};
use crate::fetch::{PageFetcher, PageRequest, fetch_document};
use crate::models::ListingEntry;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use tracing::{info, instrument};
use url::Url;

pub mod finviz;
pub mod naver;

/// What a listing parser needs besides the page itself.
#[derive(Debug, Clone)]
pub struct ListingContext {
    pub section: String,
    /// The listing page URL, used to resolve relative links.
    pub base: Url,
    pub summary_cap: usize,
    pub max_items: usize,
}

impl ListingContext {
    pub fn new(section: &str, base: Url, summary_cap: usize, max_items: usize) -> Self {
        Self {
            section: section.to_string(),
            base,
            summary_cap,
            max_items,
        }
    }

    /// Resolve `href` against the page URL. Empty or unparsable links give "".
    pub fn resolve(&self, href: &str) -> String {
        let href = href.trim();
        if href.is_empty() {
            return String::new();
        }
        self.base.join(href).map(|u| u.to_string()).unwrap_or_default()
    }
}

/// First element matching `primary`, else the first matching `alternate`.
pub(crate) fn find_container<'a>(document: &'a Html, primary: &Selector, alternate: &Selector) -> Option<ElementRef<'a>> {
    document
        .select(primary)
        .next()
        .or_else(|| document.select(alternate).next())
}

/// Parse a listing page of the given layout.
pub fn parse_listing(kind: ListingKind, document: &Html, ctx: &ListingContext) -> Vec<ListingEntry> {
    match kind {
        ListingKind::Headline => naver::parse_headlines(document, ctx),
        ListingKind::Latest => naver::parse_latest(document, ctx),
        ListingKind::Editorial => naver::parse_editorials(document, ctx),
        ListingKind::Finviz => finviz::parse_news(document, ctx),
    }
}

/// Fetch one listing page and extract its entries in document order.
///
/// # Errors
///
/// Only transport failures and malformed URLs; markup mismatches return an
/// empty list.
#[instrument(level = "info", skip(fetcher, settings))]
pub async fn collect_listing<F: PageFetcher>(
    fetcher: &F,
    kind: ListingKind,
    section: &str,
    url: &str,
    settings: &PipelineSettings,
) -> Result<Vec<ListingEntry>, Box<dyn Error>> {
    let base = Url::parse(url)?;
    let document = fetch_document(fetcher, PageRequest::new(url, settings.listing_delay)).await?;
    let ctx = ListingContext::new(section, base, settings.summary_cap, settings.max_items_per_listing);
    let entries = parse_listing(kind, &document, &ctx);
    info!(count = entries.len(), "Collected listing entries");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_and_absolute_links() {
        let ctx = ListingContext::new("x", Url::parse("https://news.naver.com/section/101").unwrap(), 70, 50);
        assert_eq!(ctx.resolve("/breakingnews/section/101/259"), "https://news.naver.com/breakingnews/section/101/259");
        assert_eq!(
            ctx.resolve("https://n.news.naver.com/mnews/article/015/1"),
            "https://n.news.naver.com/mnews/article/015/1"
        );
        assert_eq!(ctx.resolve("  "), "");
    }
}
